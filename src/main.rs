use clap::{Parser, Subcommand};
use pulse_lib::commands::{current_window, EntriesQuery, UsageQueries, UsageRange};
use pulse_lib::config::{
    AppConfig, ConfigOverrides, ENV_DATA_DIR, ENV_POLL_INTERVAL_MS, ENV_PROBE_TIMEOUT_MS,
    ENV_TIMELINE_TOP_N,
};
use pulse_lib::error::AppError;
use pulse_lib::platform::{ForegroundProbe, NativeProbe};
use pulse_lib::store::UsageStore;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(version, about = "Foreground application usage tracker", long_about = None)]
struct CliArgs {
    /// Directory holding the daily usage logs
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    data_dir: Option<PathBuf>,

    /// How often the foreground window is sampled
    #[arg(long, global = true, env = ENV_POLL_INTERVAL_MS)]
    poll_interval_ms: Option<u64>,

    /// Longest a single window probe may take
    #[arg(long, global = true, env = ENV_PROBE_TIMEOUT_MS)]
    probe_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record foreground usage until interrupted
    Track,
    /// Total time per app
    Summary {
        #[arg(long, default_value = "day")]
        range: UsageRange,
    },
    /// Raw usage records
    Entries {
        #[arg(long, default_value = "day")]
        range: UsageRange,
        /// Only records of this app
        #[arg(long)]
        app: Option<String>,
    },
    /// Per-title breakdown for one app
    Details {
        #[arg(long)]
        app: String,
        #[arg(long, default_value = "day")]
        range: UsageRange,
    },
    /// Half-hour stacked timeline
    Timeline {
        #[arg(long, default_value = "day")]
        range: UsageRange,
        /// Apps shown as their own series
        #[arg(long, env = ENV_TIMELINE_TOP_N)]
        top: Option<usize>,
    },
    /// Summary as CSV
    Export {
        #[arg(long, default_value = "day")]
        range: UsageRange,
        /// Write to this file instead of stdout; a directory gets the suggested file name
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// The window that has focus right now
    Current,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Init(#[from] pulse_lib::InitError),
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn export(queries: &UsageQueries, range: UsageRange, output: Option<PathBuf>) -> Result<(), AppError> {
    let csv = queries.export_csv(range)?;
    let Some(mut path) = output else {
        let mut out = io::stdout().lock();
        out.write_all(csv.content.as_bytes())?;
        writeln!(out)?;
        return Ok(());
    };

    if path.is_dir() {
        path.push(&csv.file_name);
    }
    fs::write(&path, csv.content)?;
    log::info!("Exported {} usage to {}", range.label(), path.display());
    Ok(())
}

fn execute(args: CliArgs) -> Result<(), CliError> {
    let timeline_top_n = match args.command {
        Command::Timeline { top, .. } => top,
        Command::Track
        | Command::Summary { .. }
        | Command::Entries { .. }
        | Command::Details { .. }
        | Command::Export { .. }
        | Command::Current => None,
    };
    let config = AppConfig::resolve(ConfigOverrides {
        data_dir: args.data_dir,
        poll_interval_ms: args.poll_interval_ms,
        probe_timeout_ms: args.probe_timeout_ms,
        timeline_top_n,
    })?;

    let queries = || UsageStore::open(&config.data_dir).map(UsageQueries::new);
    match args.command {
        Command::Track => pulse_lib::run(&config)?,
        Command::Current => {
            let probe: Arc<dyn ForegroundProbe> = Arc::new(NativeProbe::new());
            let timeout = Duration::from_millis(config.probe_timeout_ms);
            print_json(&current_window(&probe, timeout)?)?;
        }
        Command::Summary { range } => print_json(&queries()?.get_summary(range)?)?,
        Command::Entries { range, app } => {
            print_json(&queries()?.get_entries(&EntriesQuery { range, app })?)?;
        }
        Command::Details { app, range } => {
            print_json(&queries()?.get_app_details(range, &app)?)?;
        }
        Command::Timeline { range, .. } => {
            print_json(&queries()?.get_timeline(range, config.timeline_top_n)?)?;
        }
        Command::Export { range, output } => export(&queries()?, range, output)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match execute(CliArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
