use anyhow::{Context, Result};
use freight_auth::create_auth_manager;

const DEFAULT_EXPORT_LIMIT: u32 = 50;

enum Command {
    Audit { limit: u32 },
    Metrics,
}

fn parse_args(arg: Option<String>) -> Result<Command> {
    // ---
    match arg.as_deref() {
        None => Ok(Command::Audit {
            limit: DEFAULT_EXPORT_LIMIT,
        }),
        Some("--metrics") => Ok(Command::Metrics),
        Some(arg) => {
            let limit = arg
                .parse::<u32>()
                .with_context(|| format!("LIMIT must be a non-negative integer, got {arg:?}"))?;
            Ok(Command::Audit { limit })
        }
    }
}

/// Opens the auth store (creating it and the admin account on first run) and
/// prints the most recent audit entries as JSON lines, newest first.
///
/// With `--metrics`, prints the counters recorded during startup in
/// Prometheus text format instead. Needs `AUTH_METRICS_TYPE=prom`.
///
/// Usage: `freight-auth [LIMIT | --metrics]`
#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let command = parse_args(std::env::args().nth(1))?;
    let manager = create_auth_manager().await?;

    match command {
        Command::Audit { limit } => {
            for entry in manager.recent_audit_entries(limit).await? {
                println!("{}", serde_json::to_string(&entry)?);
            }
        }
        Command::Metrics => {
            let text = manager.render_metrics();
            if text.is_empty() {
                tracing::warn!("No metrics to render; set AUTH_METRICS_TYPE=prom");
            }
            print!("{text}");
        }
    }

    Ok(())
}
