//! Lumen desktop shell.
//!
//! Usage:
//!   lumen [URL] [--incognito] [--config PATH]
//!
//! Examples:
//!   lumen                          → opens the configured home page
//!   lumen wikipedia.org            → https:// is added automatically
//!   lumen --incognito servo.org    → first window is incognito

mod browser;
mod dialogs;
mod error;
mod keyboard;
mod preferences;
mod rendering;
mod resources;
mod servo_glue;
mod shortcuts;
mod title;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lumen::config::Config;
use lumen::session::SessionMode;
use lumen::urlbar::normalize_input;
use tracing::error;
use winit::event_loop::EventLoop;

use crate::browser::App;
use crate::error::ShellError;

#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "Tabbed browser on the Servo engine")]
struct Args {
    /// Page to open instead of the home page.
    url: Option<String>,

    /// Open the first window in incognito mode.
    #[arg(long)]
    incognito: bool,

    /// Configuration file (skips the usual search locations).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Lumen stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ShellError> {
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        return Err(ShellError::CryptoProvider);
    }

    #[cfg(debug_assertions)]
    tracing::warn!("Debug build: pages load very slowly, prefer --release");

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    resources::init();

    let mode = if args.incognito {
        SessionMode::Incognito
    } else {
        SessionMode::Persistent
    };
    let initial_url = args.url.as_deref().and_then(normalize_input);

    let event_loop = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config, mode, initial_url);
    event_loop.run_app(&mut app)?;
    Ok(())
}
