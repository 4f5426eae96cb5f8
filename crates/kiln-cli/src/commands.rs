//! The `terminate`, `logs` and `agents` subcommands.

use std::process::ExitCode;
use std::sync::Arc;

use kiln_client::{Admin, AgentInfo, Kernel};
use kiln_transport::HttpTransport;

use crate::pretty;
use crate::stats;

pub async fn terminate(transport: Arc<HttpTransport>, name: &str, show_stats: bool) -> ExitCode {
    pretty::wait("Terminating the session...");
    let kernel = Kernel::attach(transport, name);
    match kernel.destroy().await {
        Ok(ret) => {
            pretty::done("Done.");
            if show_stats {
                stats::print_destroy_stats(ret.as_ref());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            pretty::fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

pub async fn logs(transport: Arc<HttpTransport>, name: &str) -> ExitCode {
    pretty::wait("Retrieving container logs...");
    let kernel = Kernel::attach(transport, name);
    match kernel.get_logs().await {
        Ok(value) => {
            let logs = value
                .pointer("/result/logs")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            println!("{logs}");
            pretty::done("End of logs.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            pretty::fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

const AGENT_HEADERS: [&str; 6] = [
    "ID",
    "Status",
    "First Contact",
    "Mem.Slots",
    "CPU Slots",
    "GPU Slots",
];

fn agent_row(agent: &AgentInfo) -> [String; 6] {
    [
        agent.id.clone(),
        agent.status.clone(),
        agent.first_contact.clone(),
        agent.mem_slots.to_string(),
        agent.cpu_slots.to_string(),
        agent.gpu_slots.to_string(),
    ]
}

fn format_agent_table(agents: &[AgentInfo]) -> String {
    let rows: Vec<[String; 6]> = agents.iter().map(agent_row).collect();
    let mut widths: [usize; 6] = AGENT_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let render = |cells: &[String; 6]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: [String; 6] = AGENT_HEADERS.map(ToString::to_string);
    let separator: [String; 6] = widths.map(|w| "-".repeat(w));
    let mut lines = vec![render(&header), render(&separator)];
    lines.extend(rows.iter().map(render));
    lines.join("\n")
}

pub async fn agents(transport: Arc<HttpTransport>, status: &str) -> ExitCode {
    match Admin::list_agents(&*transport, status).await {
        Ok(agents) => {
            if agents.is_empty() {
                println!("There are no matching agents.");
            } else {
                println!("{}", format_agent_table(&agents));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            pretty::fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
