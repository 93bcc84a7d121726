use crate::config::{load_config, save_config};
use crate::games::{BinarySearchGame, CaptionGame, RpsGame, UnlockGame};
use crate::runner::{run_session, Session};
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

// Tick intervals the original games ran at.
const CAPTION_TICK_SECS: f64 = 1.0;
const GUESS_TICK_SECS: f64 = 3.0;
const RPS_TICK_SECS: f64 = 5.0;
const UNLOCK_TICK_SECS: f64 = 3.0;

#[derive(Parser)]
#[command(
    name = "gesture-games",
    version,
    about = "Camera gesture games on a Teachable Machine classifier"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every camera-driven mode. Unset values fall back to the
/// persisted config.
#[derive(Args, Clone, Debug)]
pub struct SessionArgs {
    /// Camera device index
    #[arg(short, long)]
    pub camera: Option<u32>,
    /// Directory containing model.onnx and labels.txt
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,
    /// Seconds between game ticks
    #[arg(short, long)]
    pub tick: Option<f64>,
    /// Scale captured frames to a square of this many pixels
    #[arg(long)]
    pub input_size: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the live label and confidence each tick
    Caption(SessionArgs),
    /// Guess your number from thumbs up/down gestures
    Guess(SessionArgs),
    /// Rock-paper-scissors against a random computer choice
    Rps(SessionArgs),
    /// Enter a four digit passcode one gesture at a time
    Unlock {
        #[command(flatten)]
        session: SessionArgs,
        /// Expected four digit code
        #[arg(short, long)]
        passcode: Option<String>,
    },
    /// Persist default settings
    Config {
        #[command(subcommand)]
        setting: ConfigSubcommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Set the default camera index
    Camera { index: u32 },
    /// Set the default model directory
    ModelDir { dir: PathBuf },
    /// Set the default unlock passcode
    Passcode { code: String },
}

pub fn run_cli() -> ExitCode {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

pub fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Caption(args) => {
            let session = build_session(&args, CAPTION_TICK_SECS)?;
            run_session(&session, &mut CaptionGame::new())
        }
        Commands::Guess(args) => {
            let session = build_session(&args, GUESS_TICK_SECS)?;
            run_session(&session, &mut BinarySearchGame::default())
        }
        Commands::Rps(args) => {
            let session = build_session(&args, RPS_TICK_SECS)?;
            run_session(&session, &mut RpsGame::new())
        }
        Commands::Unlock { session, passcode } => {
            let code = passcode.unwrap_or_else(|| load_config().passcode);
            let session = build_session(&session, UNLOCK_TICK_SECS)?;
            run_session(&session, &mut UnlockGame::new(code))
        }
        Commands::Config { setting } => {
            configure(setting);
            Ok(())
        }
    }
}

fn build_session(args: &SessionArgs, default_tick: f64) -> Result<Session, Box<dyn Error>> {
    let tick = args.tick.unwrap_or(default_tick);
    // Duration::from_secs_f64 panics on negative or NaN input
    if !tick.is_finite() || tick <= 0.0 {
        return Err(format!("tick must be a positive number of seconds, got {tick}").into());
    }
    let cfg = load_config();
    Ok(Session {
        camera: args.camera.unwrap_or(cfg.camera),
        model_dir: args.model_dir.clone().unwrap_or(cfg.model_dir),
        tick: Duration::from_secs_f64(tick),
        input_size: args.input_size,
    })
}

fn configure(setting: ConfigSubcommand) {
    let mut cfg = load_config();
    match setting {
        ConfigSubcommand::Camera { index } => {
            cfg.camera = index;
            info!("default camera set to {index}");
        }
        ConfigSubcommand::ModelDir { dir } => {
            info!("default model directory set to {}", dir.display());
            cfg.model_dir = dir;
        }
        ConfigSubcommand::Passcode { code } => {
            cfg.passcode = code;
            info!("default passcode updated");
        }
    }
    save_config(&cfg);
}
