mod cli;

use gifloop::{
    config::{self, Config},
    convert::FfmpegConverter,
    publish,
    runner::{stop_runner, BatchRunner, RunnerSettings, SlotState},
    server,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// How long shutdown waits for the batch runner to return before aborting it.
const RUNNER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Load config, apply CLI overrides and make the output directory usable.
fn prepare(
    config_path: Option<&Path>,
    output_dir: Option<PathBuf>,
) -> Result<(Config, BatchRunner)> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }
    config::validate_for_run(&config)?;

    publish::ensure_output_dir(&config.output.dir).with_context(|| {
        format!("Failed to create output directory: {:?}", config.output.dir)
    })?;

    let swept = publish::sweep_temp_artifacts(&config.output.dir);
    if swept > 0 {
        tracing::info!("Removed {} stale temp files", swept);
    }

    let converter = FfmpegConverter::from_config(&config).context("ffmpeg is required")?;
    tracing::debug!("Using ffmpeg at {:?}", converter.ffmpeg());

    let runner = BatchRunner::new(RunnerSettings::from_config(&config), Arc::new(converter));
    Ok((config, runner))
}

async fn start(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let (mut config, runner) = prepare(config_path, output_dir)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting gifloop");
    tracing::info!(
        "{} sources, serving {:?}",
        config.batch.sources.len(),
        config.output.dir
    );

    let stop = runner.stop_signal();
    let runner_handle = tokio::spawn(runner.run());

    let server_result = server::start_server(&config).await;

    // Cleanup
    tracing::info!("Shutting down...");
    stop_runner(&stop, runner_handle, RUNNER_SHUTDOWN_GRACE).await;

    server_result
}

async fn run_once(config_path: Option<&Path>, output_dir: Option<PathBuf>) -> Result<()> {
    let (_config, mut runner) = prepare(config_path, output_dir)?;

    let report = runner.run_pass().await;

    for item in &report.items {
        match item.state {
            SlotState::Published => match item.publish_error {
                Some(ref e) => println!("  [{}] converted, not published: {}", item.slot, e),
                None => println!("  [{}] published", item.slot),
            },
            _ => println!(
                "  [{}] {}: {}",
                item.slot,
                item.state,
                item.error.as_deref().unwrap_or("")
            ),
        }
    }

    println!(
        "\n{} published, {} discarded",
        report.published(),
        report.discarded()
    );

    if report.published() == 0 && !report.items.is_empty() {
        anyhow::bail!("Every source failed to convert");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gifloop=trace,gifloop_av=trace,tower_http=debug".to_string()
        } else {
            "gifloop=debug,gifloop_av=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            output_dir,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start(cli.config.as_deref(), host, port, output_dir))
        }
        Commands::RunOnce { output_dir } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_once(cli.config.as_deref(), output_dir))
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("gifloop {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = gifloop_av::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to convert streams.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Output: {:?}", config.output.dir);
            println!("  Sources: {}", config.batch.sources.len());
            println!("  Clip duration: {}s", config.batch.duration_secs);
            println!("  Filter: {}", config.encoding.filter_chain());
            if config.batch.sources.is_empty() {
                println!("  Warning: no sources configured, `start` will refuse to run");
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Output: {:?}", config.output.dir);
        }
    }

    Ok(())
}
