//! textfit entrypoint.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_events::{EVENT_CHANNEL_CAP, Event, EventSourceRegistry, FileWatchSource, TickEventSource};
use core_overflow::OverflowDetector;
use std::io::Write;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

mod cli;
mod commands;
mod watch;

use cli::{Args, Command};
use watch::{CtrlCSource, WatchRuntime};

const LOG_FILE: &str = "textfit.log";

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global tracing subscriber already installed; drop guard so writer shuts down.
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let _log_guard = configure_logging();
    install_panic_hook();

    let args = Args::parse();
    info!(
        target: "runtime",
        config_override = args.config.is_some(),
        "startup"
    );
    let config = load_from(args.config.clone())?;

    match args.command {
        Command::Check {
            page,
            text,
            strategy,
            selectors,
        } => {
            let mut doc = commands::load_document(&page, &config)?;
            let mut detector = OverflowDetector::new();
            let lines = commands::check(
                &mut doc,
                &mut detector,
                &config,
                &selectors,
                text.as_deref(),
                strategy,
            )?;
            let mut stdout = std::io::stdout().lock();
            for line in lines {
                writeln!(stdout, "{line}")?;
            }
        }
        Command::Scrollbar { page } => {
            let mut doc = commands::load_document(&page, &config)?;
            println!("{}", commands::scrollbar(&mut doc)?);
        }
        Command::Watch {
            page,
            tick_ms,
            selectors,
        } => {
            let doc = commands::load_document(&page, &config)?;
            let mut runtime = WatchRuntime::new(
                page.clone(),
                doc,
                OverflowDetector::new(),
                &config,
                &selectors,
                std::io::stdout(),
            )?;

            let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
            let mut registry = EventSourceRegistry::new();
            registry.register(TickEventSource::new(Duration::from_millis(tick_ms.max(1))));
            registry.register(FileWatchSource::new(page));
            registry.register(CtrlCSource);
            let source_handles = registry.spawn_all(&tx);
            runtime.run(rx, tx, source_handles).await?;
        }
    }

    info!(target: "runtime", "exit");
    Ok(())
}
