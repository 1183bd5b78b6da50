//! privlight — light up your keyboard while you are root
//!
//! Usage:
//!   privlight                         → watch $HISTFILE, drive devices
//!   privlight --mode log              → watch /var/log/auth.log instead
//!   privlight --dry-run --json        → log actions, JSON status per cycle
//!   privlight devices                 → list detected lighting devices
//!   privlight init-config             → print the default config as TOML
//!   privlight version                 → show version

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use privlight::config::PrivlightConfig;
use privlight::monitor::{LineSource, Monitor, MonitorConfig};
use privlight_core::{Actuator, Rgb, SourceMode};
use privlight_fx::{
    render_device_list, DeviceManager, DryRunIndicator, StaticColorIndicator, SysfsDeviceManager,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "privlight",
    about = "Track privilege escalation from shell history or the auth log and show it on lighting devices",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file (TOML). Default: ~/.config/privlight/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source mode: history or log
    #[arg(short, long, global = true)]
    mode: Option<SourceMode>,

    /// Path of the history file or auth log to watch
    #[arg(short, long, global = true)]
    source: Option<PathBuf>,

    /// Polling interval in seconds
    #[arg(short, long, global = true)]
    interval: Option<u64>,

    /// Colour while elevated, as r,g,b
    #[arg(long, global = true)]
    elevated_color: Option<Rgb>,

    /// Colour at baseline, as r,g,b
    #[arg(long, global = true)]
    baseline_color: Option<Rgb>,

    /// Log actions but don't touch devices
    #[arg(long, default_value_t = false, global = true)]
    dry_run: bool,

    /// Emit JSON status on stdout each poll cycle
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Debug logging
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Write logs to this file (in addition to stderr). Default: ~/.privlight.log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Only log to stderr
    #[arg(long, default_value_t = false, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the source and drive the indicator (default)
    Run,
    /// List detected lighting devices
    Devices,
    /// Print the default configuration as TOML
    InitConfig,
    /// Show version
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("privlight: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Version) => {
            println!("privlight v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some(Commands::InitConfig) => {
            print!("{}", PrivlightConfig::default().to_toml());
            return Ok(());
        }
        _ => {}
    }

    compatibility_check()?;

    let config_path = cli
        .config
        .clone()
        .or_else(PrivlightConfig::default_path);
    let (mut config, outcome) = match &config_path {
        Some(path) => {
            let (config, outcome) = PrivlightConfig::load_with_outcome(path);
            (config, Some(outcome))
        }
        None => (PrivlightConfig::default(), None),
    };
    apply_overrides(&cli, &mut config);

    let log_file = if cli.no_log_file {
        config.validate_settings()?;
        None
    } else {
        config.validate()?;
        config.log_file_path()
    };
    let _guard = init_tracing(cli.verbose, log_file.as_deref())?;
    if let (Some(path), Some(outcome)) = (&config_path, &outcome) {
        outcome.log(path);
    }

    match cli.command {
        Some(Commands::Devices) => list_devices(&config).await,
        _ => watch(&cli, &config).await,
    }
}

fn apply_overrides(cli: &Cli, config: &mut PrivlightConfig) {
    if let Some(mode) = cli.mode {
        config.source.mode = mode;
    }
    if let Some(path) = &cli.source {
        config.source.path = Some(path.clone());
    }
    if let Some(secs) = cli.interval {
        config.poll.interval_secs = secs;
    }
    if let Some(color) = cli.elevated_color {
        config.colors.elevated = color;
    }
    if let Some(color) = cli.baseline_color {
        config.colors.baseline = color;
    }
    if let Some(path) = &cli.log_file {
        config.log_file = Some(path.clone());
    }
}

/// The sysfs backend and the default sources only exist on Linux.
fn compatibility_check() -> anyhow::Result<()> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        anyhow::bail!("Linux not detected (running on {})", std::env::consts::OS)
    }
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let default_filter = if verbose {
        "privlight=debug,privlight_fx=debug"
    } else {
        "privlight=info,privlight_fx=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;
            // The appender panics on a path it cannot open; fail with a message instead.
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("cannot open log file {}: {}", path.display(), e))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn watch(cli: &Cli, config: &PrivlightConfig) -> anyhow::Result<()> {
    let source = LineSource::new(config.source_path()?, config.source.mode);

    let actuator: Box<dyn Actuator> = if cli.dry_run {
        Box::new(DryRunIndicator)
    } else {
        Box::new(
            StaticColorIndicator::new(
                SysfsDeviceManager::new(&config.devices.sysfs_root),
                config.colors.elevated,
                config.colors.baseline,
            )
            .with_effect(config.devices.effect.clone()),
        )
    };

    let monitor_config = MonitorConfig {
        interval: config.interval(),
        json_stdout: cli.json,
        indicate_on_start: true,
    };

    let mut monitor = Monitor::start(source, config.classifier(), actuator, monitor_config).await?;

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));
    monitor.run(cancel).await;
    Ok(())
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
    cancel.cancel();
}

async fn list_devices(config: &PrivlightConfig) -> anyhow::Result<()> {
    let manager = SysfsDeviceManager::new(&config.devices.sysfs_root);
    let devices = manager.enumerate_devices().await?;
    print!("{}", render_device_list(&devices, &config.devices.effect));
    Ok(())
}
