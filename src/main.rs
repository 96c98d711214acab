//! qr2key binary entry point.
//!
//! Wires the serial supervisor, framer/decoder, and output dispatcher into
//! the blocking bridge loop, then runs until Ctrl-C.
//!
//! ```text
//! main()
//!  └─ AppConfig::load()            -- TOML config, defaults on any failure
//!  └─ detect_output_mode()         -- one-shot capability detection
//!  └─ ctrl_c task                  -- flips the shared stop flag
//!  └─ spawn_blocking(bridge.run()) -- poll → frame → decode → dispatch
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qr2key::application::dispatch::{OutputDispatcher, OutputMode};
use qr2key::application::ScanBridge;
use qr2key::domain::AppConfig;
use qr2key::infrastructure::serial::{system::SystemPortProvider, ConnectionSupervisor};

/// Bridge a serial QR scanner into keystrokes on the focused window.
#[derive(Debug, Parser)]
#[command(name = "qr2key", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(default_value = "config.toml")]
    config: PathBuf,
}

/// Resolves the delivery mechanism once for the process lifetime: native
/// keystroke injection on Windows, the console echo everywhere else.
fn detect_output_mode() -> OutputMode {
    #[cfg(target_os = "windows")]
    {
        use qr2key::infrastructure::output::windows::{ForegroundCharInjector, SendInputSimulator};
        OutputMode::Native {
            injector: Arc::new(ForegroundCharInjector::new()),
            fallback: Arc::new(SendInputSimulator::new()),
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        use qr2key::infrastructure::output::console::ConsoleEcho;
        OutputMode::Console {
            echo: Arc::new(ConsoleEcho::new()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config);
    info!(?config, "qr2key starting");

    let dispatcher = OutputDispatcher::new(detect_output_mode(), config.ime_off);
    let supervisor = ConnectionSupervisor::new(Arc::new(SystemPortProvider::new()));

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    let mut bridge = ScanBridge::new(config, supervisor, dispatcher, running);
    tokio::task::spawn_blocking(move || bridge.run()).await?;

    info!("qr2key stopped");
    Ok(())
}
