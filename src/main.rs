use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use soundstage::audio_system::{FsLoader, JsonFileStore, RodioBackend, SoundBoard};
use soundstage::config::SoundConfig;

const LOG_TARGET_STARTUP: &str = "soundstage::startup";
const TICK: Duration = Duration::from_millis(20);

const USAGE: &str = "\
Usage: soundstage <config.json> [--volume <0..1>] [--mute] <command>

Commands:
  play <name>                   Play a sound once
  theme [name] [--once]         Play a theme (looping unless --once)
  prefixed <prefix> [name] [--loop]
                                Play <prefix>, then the theme";

#[derive(Debug, PartialEq)]
enum Command {
    Play(String),
    Theme { name: Option<String>, looping: bool },
    Prefixed { prefix: String, name: Option<String>, looping: bool },
}

#[derive(Debug, PartialEq)]
struct Args {
    config: PathBuf,
    volume: Option<f32>,
    mute: bool,
    command: Command,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut volume = None;
    let mut mute = false;
    let mut looping_flag = None;
    let mut positional = Vec::new();

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--volume" => {
                let value = iter.next().context("--volume needs a value")?;
                volume = Some(value.parse::<f32>().context("--volume must be a number")?);
            }
            "--mute" => mute = true,
            "--once" => looping_flag = Some(false),
            "--loop" => looping_flag = Some(true),
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let config = PathBuf::from(positional.next().context("Missing config path")?);
    let command = match positional.next().as_deref() {
        Some("play") => Command::Play(positional.next().context("play needs a sound name")?),
        Some("theme") => Command::Theme {
            name: positional.next(),
            looping: looping_flag.unwrap_or(true),
        },
        Some("prefixed") => Command::Prefixed {
            prefix: positional.next().context("prefixed needs a prefix sound")?,
            name: positional.next(),
            looping: looping_flag.unwrap_or(false),
        },
        Some(other) => bail!("Unknown command: {}", other),
        None => bail!("Missing command"),
    };

    Ok(Args {
        config,
        volume,
        mute,
        command,
    })
}

/// Initialize tracing with file rotation
///
/// Logs go to the console and to daily files under the config directory
/// (`soundstage/logs/soundstage.YYYY-MM-DD.log`).
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("soundstage").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "soundstage.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!(target: LOG_TARGET_STARTUP, "Log directory: {}", log_dir.display());
}

fn run(args: Args) -> Result<()> {
    let config = SoundConfig::load(&args.config)?;

    let settings_path = config
        .settings_path
        .clone()
        .or_else(JsonFileStore::default_path)
        .context("Could not determine settings directory")?;
    let store = JsonFileStore::open(settings_path)?;
    let backend = RodioBackend::new()?;

    let mut board = SoundBoard::from_config(&config, &FsLoader, Box::new(backend), Box::new(store))?;

    if let Some(volume) = args.volume {
        board.set_volume(volume)?;
    }
    if args.mute {
        board.set_muted(true);
    }
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "{} sounds loaded, volume {}{}",
        board.library().len(),
        board.volume(),
        if board.muted() { " (muted)" } else { "" }
    );

    match args.command {
        Command::Play(name) => {
            board.play(&name)?;
        }
        Command::Theme { name, looping } => {
            board.play_theme(name.as_deref(), looping)?;
        }
        Command::Prefixed {
            prefix,
            name,
            looping,
        } => {
            board.play_theme_prefixed(Some(&prefix), name.as_deref(), looping)?;
        }
    }

    while !board.sounds().is_empty() {
        board.update();
        thread::sleep(TICK);
    }

    tracing::info!("Playback finished");
    Ok(())
}

fn main() {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("✗ {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    initialize_tracing();

    if let Err(e) = run(args) {
        tracing::error!("{:#}", e);
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
