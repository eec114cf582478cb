//! Subway Surfeuille headless runner
//!
//! Steps a session at a fixed frame rate with the autopilot at the controls,
//! mirrors every command into an in-memory presentation layer, and prints a
//! run summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use subway_surfeuille::consts::DEMO_DT;
use subway_surfeuille::present::{HeadlessPresentation, HudField, VisualBridge, VisualKind};
use subway_surfeuille::sim::{ParticleField, SessionState, SimWarning, step};
use subway_surfeuille::{HighScores, RunnerConfig, autopilot};

#[derive(Debug, Parser)]
#[command(name = "subway-surfeuille", about = "Run a headless lane-runner session")]
struct Cli {
    /// JSON file with runner tunables
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Maximum frames to simulate
    #[arg(long, default_value_t = 60 * 60 * 5)]
    frames: u64,
    /// Frame delta-time in seconds
    #[arg(long, default_value_t = DEMO_DT)]
    dt: f32,
    /// Also run the decorative river particles
    #[arg(long)]
    river: bool,
    /// High score file to record the run in
    #[arg(long)]
    scores: Option<PathBuf>,
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    let river_config = config.river.clone();

    let mut state = SessionState::new(config).context("starting session")?;
    let mut rng = Pcg32::seed_from_u64(cli.seed);
    let mut presenter = HeadlessPresentation::new();
    let mut bridge = VisualBridge::new();
    // Particles keep their own ID space, so they get their own bridge
    let mut river_bridge = VisualBridge::new();
    let mut river = if cli.river {
        Some(ParticleField::new(river_config).context("starting river")?)
    } else {
        None
    };

    log::info!("Subway Surfeuille starting (seed {})", cli.seed);
    bridge.apply(&state.initial_commands(), &mut presenter);

    let mut cap_warnings = 0usize;
    let mut peak_obstacles = 0usize;
    for _ in 0..cli.frames {
        let input = autopilot::suggest_input(&state);
        let out = step(&mut state, &input, cli.dt, &mut rng)?;
        bridge.apply(&out.commands, &mut presenter);
        cap_warnings += out
            .warnings
            .iter()
            .filter(|w| matches!(w, SimWarning::ObstacleCapReached { .. }))
            .count();
        peak_obstacles = peak_obstacles.max(state.obstacles.len());

        if let Some(field) = river.as_mut() {
            let commands = field.step(cli.dt, &mut rng)?;
            river_bridge.apply(&commands, &mut presenter);
        }

        if state.is_over() {
            break;
        }
    }

    println!("Frames:        {}", state.frames);
    println!("Elapsed:       {:.2}s", state.elapsed_secs());
    println!("Final speed:   {}", state.speed);
    println!(
        "HUD:           {} | {}",
        presenter.hud_text(HudField::Score).unwrap_or("-"),
        presenter.hud_text(HudField::Lives).unwrap_or("-")
    );
    println!("Game over:     {}", presenter.game_over_count > 0);
    println!("Peak obstacles: {peak_obstacles} (cap warnings: {cap_warnings})");
    println!(
        "Live visuals:  {} obstacles, {} water particles",
        presenter.count_kind(|k| matches!(k, VisualKind::Obstacle(_))),
        presenter.count_kind(|k| k == VisualKind::WaterParticle)
    );

    if let Some(path) = &cli.scores {
        let mut scores = HighScores::load(path)?;
        match scores.add_score(state.score, state.elapsed_secs(), cli.seed) {
            Some(rank) => {
                scores.save(path)?;
                println!("New high score! Rank #{rank}");
            }
            None => println!("Best score so far: {}", scores.top_score().unwrap_or(0)),
        }
    }

    Ok(())
}
