//! Achilles Arena headless runner
//!
//! Runs one match between two tweaked bots and prints the result.
//!
//! Usage:
//!   achilles-arena --tweak1 extraLife --tweak2 regeneration --seed 7
//!   RUST_LOG=debug achilles-arena --authored glass-cannon.json --realtime

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;

use achilles_arena::authoring::{AuthoredTweak, AuthoringError, TweakAuthor};
use achilles_arena::consts::TICK_MS;
use achilles_arena::platform::{Clock, ManualClock, SystemClock};
use achilles_arena::sim::Outcome;
use achilles_arena::{GameLoop, MatchController, QualityPreset, Settings};

#[derive(Parser)]
#[command(name = "achilles-arena")]
#[command(about = "Run a two-bot weak-spot match in an octagonal arena")]
struct Args {
    /// Tweak id for bot 1
    #[arg(long, default_value = "none")]
    tweak1: String,

    /// Tweak id for bot 2
    #[arg(long, default_value = "none")]
    tweak2: String,

    /// RNG seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Quality preset (low, medium, high); overrides the settings file
    #[arg(long)]
    quality: Option<String>,

    /// Settings JSON; defaults are used when the file is missing
    #[arg(long, default_value = "achilles-arena.json")]
    settings: PathBuf,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,

    /// Pace ticks against the real clock instead of simulating time
    #[arg(long)]
    realtime: bool,

    /// Generator response (JSON) to compile into a tweak
    #[arg(long)]
    authored: Option<PathBuf>,

    /// Bot (1 or 2) that receives the authored tweak
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    authored_bot: u8,
}

/// Replays a saved generator response
struct FileAuthor {
    path: PathBuf,
}

impl TweakAuthor for FileAuthor {
    fn author(&self, _description: &str) -> Result<AuthoredTweak, AuthoringError> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| AuthoringError::Service(format!("{}: {e}", self.path.display())))?;
        AuthoredTweak::from_json(&json)
    }
}

fn prepare<C: Clock>(args: &Args, settings: Settings, clock: C) -> Result<MatchController<C>> {
    let mut controller = MatchController::new(settings, clock).context("invalid settings")?;
    controller.select_tweak(0, &args.tweak1);
    controller.select_tweak(1, &args.tweak2);

    if let Some(path) = &args.authored {
        let slot = usize::from(args.authored_bot - 1);
        let author = FileAuthor { path: path.clone() };
        let selection = controller
            .author_tweak(&author, None, slot, &path.display().to_string())
            .with_context(|| format!("authored tweak {} was not accepted", path.display()))?;
        log::info!(
            "Bot {} uses authored tweak '{}'",
            args.authored_bot,
            selection.tweak_id
        );
    }

    for slot in 0..2 {
        let id = controller.selection(slot);
        if !controller.registry().contains(id) {
            log::warn!("Unknown tweak '{}' for bot {}, using 'none'", id, slot + 1);
        }
    }
    Ok(controller)
}

fn run_simulated(controller: &mut MatchController<ManualClock>, max_ticks: u64) {
    controller.start_selected();
    for _ in 0..max_ticks {
        controller.clock().advance(TICK_MS);
        controller.tick();
        if controller.is_over() {
            break;
        }
    }
}

fn run_realtime(controller: &mut MatchController<SystemClock>, max_ticks: u64) {
    let frame = Duration::from_secs_f64(TICK_MS / 1000.0);
    let mut game_loop = GameLoop::new();
    let mut ticks = 0;
    let mut last = Instant::now();

    controller.start_selected();
    while ticks < max_ticks && !controller.is_over() {
        std::thread::sleep(frame);
        let now = Instant::now();
        ticks += u64::from(game_loop.advance(controller, (now - last).as_secs_f32()));
        last = now;
    }
}

fn report<C: Clock>(controller: &MatchController<C>) -> Result<()> {
    let Some(state) = controller.state() else {
        bail!("match never started");
    };

    for event in controller.events() {
        log::debug!("{:?}", event);
    }

    println!("=== MATCH RESULT ===");
    for bot in &state.bots {
        println!(
            "  Bot {} [{}]: {}/{} health",
            bot.id + 1,
            bot.tweak().name(),
            bot.health.max(0),
            bot.max_health
        );
    }
    println!("  Ticks:   {}", state.time_ticks);
    println!("  Elapsed: {:.1}s", controller.elapsed_time().as_secs_f64());
    match controller.outcome() {
        Some(Outcome::Winner(id)) => println!("  Winner:  Bot {}", id + 1),
        Some(Outcome::Draw) => println!("  Result:  Draw"),
        None => println!("  Result:  Undecided (tick limit reached)"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = Settings::load(&args.settings)
        .with_context(|| format!("loading settings from {}", args.settings.display()))?;
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(quality) = &args.quality {
        let Some(preset) = QualityPreset::parse(quality) else {
            bail!("unknown quality preset '{quality}'");
        };
        settings.quality = preset;
    }

    if args.realtime {
        let mut controller = prepare(&args, settings, SystemClock::new())?;
        run_realtime(&mut controller, args.max_ticks);
        report(&controller)
    } else {
        let mut controller = prepare(&args, settings, ManualClock::new(0.0))?;
        run_simulated(&mut controller, args.max_ticks);
        report(&controller)
    }
}
