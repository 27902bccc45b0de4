//! Gesture-to-keyboard application driven by recorded landmark sessions.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use phantomcast::{
    config::{Settings, SharedProfile},
    constants::{DEFAULT_REPLAY_FPS, DEFAULT_SETTINGS_FILE},
    emitter::{KeyInjector, LogInjector},
    engine::{EngineState, GestureEngine},
    runtime::{LoopTiming, Runtime},
    source::{RecordedLandmarks, ReplayGrabber},
    x11_input::X11KeyInjector,
};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to settings file (JSON, or YAML by extension)
    #[arg(short = 'C', long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Recorded landmark session to replay (JSON lines)
    #[arg(short, long)]
    replay: PathBuf,

    /// Restart the recording when it ends
    #[arg(long)]
    loop_replay: bool,

    /// Playback rate of the recording
    #[arg(long, default_value_t = DEFAULT_REPLAY_FPS)]
    replay_fps: f64,

    /// Log key events instead of injecting them
    #[arg(long)]
    dry_run: bool,

    /// Start processing gestures immediately
    #[arg(long)]
    start: bool,

    /// Period of both worker loops in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn print_help() {
    println!("Commands: t|toggle, s|save, status, set <name> <value>, q|quit");
}

fn control_loop<I: KeyInjector + 'static>(runtime: &Runtime<I>, config_path: &Path) -> Result<()> {
    print_help();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        let mut words = line.split_whitespace();

        match words.next() {
            Some("t" | "toggle") => {
                let state = runtime.toggle();
                println!("{}", if state == EngineState::Running { "RUNNING" } else { "STOPPED" });
            }
            Some("s" | "save") => match runtime.profile().settings().to_file(config_path) {
                Ok(()) => println!("Settings saved to {}", config_path.display()),
                Err(e) => println!("Save failed: {e}"),
            },
            Some("status") => {
                let (hud, keys) = runtime.status();
                println!("{}", hud.render(&keys));
            }
            Some("set") => {
                let (Some(name), value) = (words.next(), words.collect::<Vec<_>>().join(" ")) else {
                    println!("Usage: set <name> <value>");
                    continue;
                };
                let mut settings = runtime.profile().settings();
                match settings
                    .set_field(name, &value)
                    .and_then(|()| runtime.profile().update(&settings))
                {
                    Ok(()) => println!("{name} = {value}"),
                    Err(e) => println!("Rejected: {e}"),
                }
            }
            Some("q" | "quit") => break,
            Some(_) => print_help(),
            None => {}
        }

        if runtime.is_stopped() {
            warn!("Frame source stopped, exiting");
            break;
        }
    }
    Ok(())
}

fn run<I: KeyInjector + 'static>(args: &Args, injector: I, profile: SharedProfile) -> Result<()> {
    let grabber = ReplayGrabber::open(&args.replay, args.replay_fps, args.loop_replay)
        .with_context(|| format!("Cannot start frame source {}", args.replay.display()))?;

    let timing = args.interval_ms.map_or_else(LoopTiming::default, |ms| LoopTiming {
        frame_interval: Duration::from_millis(ms),
        classify_interval: Duration::from_millis(ms),
    });

    let mut engine = GestureEngine::new(injector, profile);
    if args.start {
        engine.start();
    }

    let runtime = Runtime::spawn(grabber, RecordedLandmarks, engine, timing)?;
    let control = control_loop(&runtime, &args.config);
    runtime.shutdown().context("Frame source failed")?;
    control
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("PhantomCast gesture engine");

    let settings = Settings::load_or_default(&args.config);
    let profile = SharedProfile::from_settings(&settings).context("Invalid settings")?;

    if args.dry_run {
        run(&args, LogInjector, profile)
    } else {
        let injector = X11KeyInjector::new().context("Key injection unavailable (try --dry-run)")?;
        run(&args, injector, profile)
    }
}
