//! Warden process monitoring agent.
//!
//! Supervisor entry point: wires logging, the transport channels and the
//! monitoring features together, then waits for a shutdown signal.

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use warden_config::ModuleRegistry;
use warden_core::RuntimeInfo;
use warden_notify::{HookRegistry, NotifyFeature, NotifyOptions};
use warden_profiling::ProfilingFeature;
use warden_protocols::Feature;
use warden_transport::{
    LogChannel, StreamChannel, TransportChannel, TransportManager, WebhookChannel,
};

/// Warden CLI.
#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Process monitoring agent")]
#[command(version)]
struct Cli {
    /// Severity threshold for notifications
    #[arg(long, default_value = "info")]
    level: String,

    /// Do not install global fault hooks
    #[arg(long)]
    no_catch_exceptions: bool,

    /// Backend ingestion URL for the webhook channel
    #[arg(long, env = "WARDEN_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Emit envelopes as JSON lines on stdout
    #[arg(long)]
    stdout_stream: bool,

    /// Force the fallback profiling variants
    #[arg(long)]
    profiling_fallback: bool,
}

/// Initialize tracing on the diagnostic error stream.
///
/// Stdout stays clean for the envelope stream; fault diagnostics and agent
/// logs both land on stderr.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();

    info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // Transport: log channel always, stream and webhook per configuration.
    let mut channels: Vec<Box<dyn TransportChannel>> = vec![Box::new(LogChannel)];
    if cli.stdout_stream {
        info!("Adding stdout stream channel");
        channels.push(Box::new(StreamChannel::stdout()));
    }
    if let Some(url) = &cli.webhook_url {
        info!("Adding webhook channel");
        channels.push(Box::new(WebhookChannel::new(url)));
    }
    let transport = Arc::new(TransportManager::new(channels));

    let modules = ModuleRegistry::global();
    modules.attach_transport(transport.clone());

    let runtime = RuntimeInfo::from_env();
    info!(
        "Hosting runtime version {} ({:?} mode)",
        runtime.version, runtime.exec_mode
    );

    let options = NotifyOptions {
        level: cli.level.clone(),
        catch_exceptions: !cli.no_catch_exceptions,
    };
    let mut notify = NotifyFeature::new(
        options,
        runtime.clone(),
        transport.clone(),
        modules.clone(),
        HookRegistry::global(),
    );
    notify.init().await?;
    info!("Notify feature ready");

    let mut profiling = ProfilingFeature::new(runtime, transport.clone(), modules.clone());
    if cli.profiling_fallback {
        profiling = profiling.with_force_fallback();
    }
    profiling.init().await?;
    info!("Profiling feature ready");

    wait_for_shutdown().await;

    info!("Shutting down...");
    if let Err(e) = notify.destroy().await {
        error!("Notify teardown failed: {}", e);
    }
    if let Err(e) = profiling.destroy().await {
        error!("Profiling teardown failed: {}", e);
    }
    transport.flush().await;

    Ok(())
}

/// Block until SIGTERM or SIGINT (Unix).
#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            error!("Signal setup failed: {}", e);
            return;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            error!("Signal setup failed: {}", e);
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
}

/// Block until Ctrl+C (non-Unix fallback).
#[cfg(not(unix))]
async fn wait_for_shutdown() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C");
    }
}
