// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes plus node and service tables.

use serde::Serialize;
use std::time::Instant;

use crate::backend::{Node, ServiceSummary};
use crate::diagnostics::Warning;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, warning: &Warning) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {}", warning.message),
            OutputMode::Json => {
                let event = WarningEvent {
                    event: "warning",
                    warning,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "success",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print a result: `table` for humans, `data` as a JSON event otherwise.
    pub fn result<T: Serialize + ?Sized>(&self, table: &str, data: &T) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => print!("{table}"),
            OutputMode::Json => {
                let event = DataEvent {
                    event: "result",
                    data,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct WarningEvent<'a> {
    event: &'a str,
    #[serde(flatten)]
    warning: &'a Warning,
}

#[derive(Serialize)]
struct DataEvent<'a, T: ?Sized> {
    event: &'a str,
    data: &'a T,
}

/// Render nodes as an aligned text table.
pub fn node_table(nodes: &[Node]) -> String {
    let rows: Vec<[String; 6]> = nodes
        .iter()
        .map(|n| {
            [
                n.id.short().to_string(),
                n.instance_id
                    .as_ref()
                    .map(|i| i.as_str().to_string())
                    .unwrap_or_else(|| "-".to_string()),
                n.status.to_string(),
                n.running_tasks.to_string(),
                n.pending_tasks.to_string(),
                if n.agent_connected { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    render(
        ["NODE", "INSTANCE", "STATUS", "RUNNING", "PENDING", "AGENT"],
        &rows,
    )
}

/// Render services as an aligned text table.
pub fn service_table(services: &[ServiceSummary]) -> String {
    let rows: Vec<[String; 6]> = services
        .iter()
        .map(|s| {
            [
                s.name.clone(),
                s.status.clone(),
                s.desired.to_string(),
                s.running.to_string(),
                s.pending.to_string(),
                s.task_definition
                    .rsplit('/')
                    .next()
                    .unwrap_or(&s.task_definition)
                    .to_string(),
            ]
        })
        .collect();
    render(
        ["SERVICE", "STATUS", "DESIRED", "RUNNING", "PENDING", "TASK DEFINITION"],
        &rows,
    )
}

fn render<const N: usize>(header: [&str; N], rows: &[[String; N]]) -> String {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, header.iter().copied(), &widths);
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}
