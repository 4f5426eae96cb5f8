//! The `run` subcommand: execute a snippet or uploaded files in a
//! kernel session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;

use kiln_client::{BatchOpts, ClientError, ExecutionMode, Kernel, run_to_completion};
use kiln_transport::{HttpTransport, UploadPart};

use crate::console::StdioConsole;
use crate::pretty::{self, Printer};
use crate::stats;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The runtime or programming language name.
    pub lang: String,

    /// The code file(s) to upload and run.
    pub files: Vec<PathBuf>,

    /// Human-readable session ID or name [default: a random hex string].
    #[arg(short = 't', long, value_name = "SESSID")]
    pub client_token: Option<String>,

    /// The code snippet as a single string.
    #[arg(short = 'c', long, value_name = "CODE")]
    pub code: Option<String>,

    /// Custom shell command for building the given files.
    #[arg(long, value_name = "CMD")]
    pub build: Option<String>,

    /// Custom shell command for executing the given files.
    #[arg(long = "exec", value_name = "CMD")]
    pub exec_cmd: Option<String>,

    /// Terminate the session immediately after running.
    #[arg(long)]
    pub rm: bool,

    /// Environment variable (may appear multiple times).
    #[arg(short = 'e', long = "env", value_name = "KEY=VAL")]
    pub env: Vec<String>,

    /// User-owned virtual folder names to mount.
    #[arg(short = 'm', long = "mount", value_name = "NAME")]
    pub mount: Vec<String>,

    /// Show resource usage statistics after termination (with --rm).
    #[arg(short = 's', long)]
    pub stats: bool,

    /// Hide execution details, showing only the kernel outputs.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Strip the base directory from a resolved path. The server places
/// uploaded files by this name, so it must be the cwd-relative form.
fn relative_to_dir(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(Path::to_path_buf)
}

fn parse_envs(pairs: &[String]) -> Result<HashMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("Invalid environment variable (expected KEY=VAL): {pair}"))
        })
        .collect()
}

pub async fn run(transport: Arc<HttpTransport>, args: RunArgs) -> ExitCode {
    let ui = Printer::new(args.quiet);

    let envs = match parse_envs(&args.env) {
        Ok(envs) => envs,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(token) = &args.client_token {
        ui.info(&format!("Client session token: {token}"));
        ui.wait("Connecting to the kernel...");
    } else {
        ui.wait("Creating a temporary kernel...");
    }

    let kernel = match Kernel::get_or_create(
        transport,
        &args.lang,
        args.client_token.as_deref(),
        &args.mount,
        &envs,
    )
    .await
    {
        Ok(kernel) => kernel,
        Err(e) => {
            pretty::fail(&e.to_string());
            return ExitCode::FAILURE;
        }
    };
    if kernel.created() {
        ui.done(&format!("Session {} is ready.", kernel.id()));
    } else {
        ui.done(&format!("Reusing session {}...", kernel.id()));
    }

    let mut exit = execute_request(&kernel, &args, ui).await;

    if args.rm {
        ui.wait("Cleaning up the session...");
        match kernel.destroy().await {
            Ok(ret) => {
                ui.done("Cleaned up the session.");
                if args.stats {
                    stats::print_destroy_stats(ret.as_ref());
                }
            }
            Err(e) => {
                pretty::fail(&e.to_string());
                exit = ExitCode::FAILURE;
            }
        }
    }
    exit
}

async fn execute_request(kernel: &Kernel<HttpTransport>, args: &RunArgs, ui: Printer) -> ExitCode {
    let mut console = StdioConsole::new(args.quiet);

    let run_result = if args.files.is_empty() {
        let Some(code) = &args.code else {
            eprintln!(
                "You should provide the command-line code snippet using \
                 the \"-c\" option if run without files."
            );
            return ExitCode::FAILURE;
        };
        run_to_completion(kernel, code, ExecutionMode::Query, None, &mut console).await
    } else {
        if args.code.is_some() {
            eprintln!("You can run only either source files or a command-line code snippet.");
            return ExitCode::FAILURE;
        }
        match upload_files(kernel, &args.files, ui).await {
            Ok(()) => {}
            Err(exit) => return exit,
        }
        let opts = BatchOpts {
            build: Some(args.build.clone().unwrap_or_else(|| "*".to_string())),
            build_log: false,
            exec: Some(args.exec_cmd.clone().unwrap_or_else(|| "*".to_string())),
        };
        run_to_completion(kernel, "", ExecutionMode::Batch, Some(opts), &mut console).await
    };

    match run_result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ ClientError::Backend(_)) => {
            pretty::fail(&e.to_string());
            ExitCode::FAILURE
        }
        Err(e) => {
            pretty::fail("Execution failed!");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn upload_files(
    kernel: &Kernel<HttpTransport>,
    files: &[PathBuf],
    ui: Printer,
) -> Result<(), ExitCode> {
    ui.wait("Uploading source files...");
    let cwd = std::env::current_dir().map_err(|e| {
        pretty::fail(&format!("Cannot resolve the working directory: {e}"));
        ExitCode::FAILURE
    })?;
    let mut parts = Vec::with_capacity(files.len());
    for path in files {
        let resolved = path.canonicalize().map_err(|e| {
            pretty::fail(&format!("Cannot read {}: {e}", path.display()));
            ExitCode::FAILURE
        })?;
        let Some(name) = relative_to_dir(&resolved, &cwd) else {
            pretty::fail(&format!(
                "{} is outside the current working directory.",
                path.display()
            ));
            return Err(ExitCode::FAILURE);
        };
        let bytes = std::fs::read(&resolved).map_err(|e| {
            pretty::fail(&format!("Cannot read {}: {e}", path.display()));
            ExitCode::FAILURE
        })?;
        parts.push(UploadPart::new(
            "src",
            name.to_string_lossy().into_owned(),
            bytes,
        ));
    }

    let resp = kernel.upload(parts).await.map_err(|e| {
        pretty::fail(&e.to_string());
        ExitCode::FAILURE
    })?;
    if !resp.is_success() {
        pretty::fail("Uploading source files failed!");
        eprintln!("{}: {}\n{}", resp.status, resp.reason, resp.text());
        return Err(ExitCode::FAILURE);
    }
    ui.done("Uploading done.");
    Ok(())
}
