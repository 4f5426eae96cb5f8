//! Interactive execution loop.

use std::io;

use kiln_transport::Transport;

use crate::error::ClientError;
use crate::exec::{BatchOpts, ExecuteOpts, ExecutionMode, RunStatus};
use crate::kernel::Kernel;

/// Console and prompt collaborator for the run loop.
///
/// Routes console records to their streams and acquires interactive
/// input when the server asks for it. The CLI binds this to the real
/// stdio; tests substitute a recording implementation.
pub trait RunIo {
    /// Emit a `stdout` console record, verbatim.
    fn stdout(&mut self, text: &str);

    /// Emit a `stderr` console record, verbatim.
    fn stderr(&mut self, text: &str);

    /// Emit a record with an unrecognized stream tag. Unknown record
    /// types must stay visible rather than being silently dropped.
    fn unknown_record(&mut self, kind: &str, text: &str);

    /// Flush emitted output. Called after each step's records and
    /// before any interactive prompt, so ordering is preserved.
    fn flush(&mut self);

    /// Read one line of interactive input.
    ///
    /// # Errors
    /// Returns error if reading fails.
    fn read_line(&mut self) -> io::Result<String>;

    /// Read interactive input without echoing it.
    ///
    /// # Errors
    /// Returns error if reading fails.
    fn read_secret(&mut self) -> io::Result<String>;

    /// Report a completed phase (build finished, run finished).
    fn phase_done(&mut self, message: &str);
}

fn format_exit_code(exit_code: Option<i32>) -> String {
    exit_code.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

/// Drive one run to completion against a kernel session.
///
/// Repeatedly sends execute steps, adopting the server-assigned run ID
/// after each response, streaming console records in order, and
/// reacting to the status tag until the run reports `finished`. The
/// batch options are sent on the first call only.
///
/// The loop has no iteration cap or timeout: it terminates only when
/// the server reports `finished`. If the server never does, the client
/// waits forever; this mirrors the server contract, and timeouts belong
/// to the transport layer.
///
/// Returns the final exit code, if the server reported one.
///
/// # Errors
/// Returns the first transport, backend or protocol error; the loop
/// performs no local recovery, and the caller owns session cleanup.
pub async fn run_to_completion<T, IO>(
    kernel: &Kernel<T>,
    code: &str,
    mode: ExecutionMode,
    opts: Option<BatchOpts>,
    io: &mut IO,
) -> Result<Option<i32>, ClientError>
where
    T: Transport,
    IO: RunIo,
{
    // The server is authoritative for run identity; the first response
    // assigns the ID and every later call echoes it back.
    let mut run_id: Option<String> = None;
    let mut code = code.to_string();
    let mut mode = mode;
    let mut opts = opts;

    loop {
        let result = kernel
            .execute(
                run_id.as_deref(),
                &code,
                mode,
                opts.take().map(ExecuteOpts::Batch),
            )
            .await?;
        run_id = Some(result.run_id.clone());
        tracing::debug!(run_id = %result.run_id, status = ?result.status, "execute step");

        for record in &result.console {
            match record.stream() {
                "stdout" => io.stdout(record.text()),
                "stderr" => io.stderr(record.text()),
                other => io.unknown_record(other, record.text()),
            }
        }
        io.flush();

        match result.status {
            RunStatus::BuildFinished => {
                io.phase_done(&format!(
                    "Build finished. (exit code = {})",
                    format_exit_code(result.exit_code)
                ));
                mode = ExecutionMode::Continue;
                code.clear();
            }
            RunStatus::Finished => {
                io.phase_done(&format!(
                    "Finished. (exit code = {})",
                    format_exit_code(result.exit_code)
                ));
                return Ok(result.exit_code);
            }
            RunStatus::WaitingInput => {
                mode = ExecutionMode::Input;
                let masked = result.options.is_some_and(|o| o.is_password);
                code = if masked {
                    io.read_secret()?
                } else {
                    io.read_line()?
                };
            }
            RunStatus::Continued => {
                mode = ExecutionMode::Continue;
                code.clear();
            }
        }
    }
}
