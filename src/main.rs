use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use highway_sim::simulation::{DrivingMode, ParameterSet, SimWorld};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Uncoordinated drivers reacting past fixed thresholds
    Problem,
    /// Coordinated drivers matching their lane cohort
    Solution,
}

impl From<Mode> for DrivingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Problem => DrivingMode::Problem,
            Mode::Solution => DrivingMode::Solution,
        }
    }
}

#[derive(Parser)]
#[command(name = "highway_sim")]
#[command(about = "Headless highway traffic simulation")]
struct Cli {
    /// Driver coordination regime
    #[arg(long, value_enum, default_value = "problem")]
    mode: Mode,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in seconds (ticks outside (0, 0.1) are dropped)
    #[arg(long, default_value = "0.016")]
    delta: f32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Add a rush-hour burst before the first tick
    #[arg(long)]
    rush_hour: bool,

    /// Close a lane (repeatable)
    #[arg(long = "close-lane")]
    close_lanes: Vec<usize>,

    /// Dispatch an emergency vehicle at this tick
    #[arg(long)]
    emergency_at: Option<u32>,

    /// Spawn an on-ramp vehicle every N ticks
    #[arg(long)]
    on_ramp_every: Option<u32>,

    /// Population cap
    #[arg(long, default_value = "25")]
    max_vehicles: usize,

    /// Mainline spawn probability per tick
    #[arg(long, default_value = "0.02")]
    spawn_rate: f32,

    /// Global speed multiplier
    #[arg(long, default_value = "1.0")]
    simulation_speed: f32,

    /// Average driver relaxation level (1-8)
    #[arg(long, default_value = "3.5")]
    relaxation: f32,

    /// Average driver mental resilience (1-10)
    #[arg(long, default_value = "2.0")]
    resilience: f32,

    /// Lane-change aggression multiplier
    #[arg(long, default_value = "1.0")]
    aggression: f32,

    /// Print the per-vehicle map after every simulated second
    #[arg(long)]
    map: bool,
}

impl Cli {
    fn params(&self) -> ParameterSet {
        ParameterSet {
            max_vehicles: self.max_vehicles,
            spawn_rate: self.spawn_rate,
            simulation_speed: self.simulation_speed,
            average_relaxation_level: self.relaxation,
            mental_resilience_level: self.resilience,
            lane_change_aggression: self.aggression,
            ..ParameterSet::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if !(cli.delta.is_finite() && cli.delta > 0.0) {
        bail!("--delta must be a positive number of seconds, got {}", cli.delta);
    }
    let params = cli.params();
    params.validate().context("invalid simulation parameters")?;

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(cli.mode.into(), seed),
        None => SimWorld::new(cli.mode.into()),
    };
    world.set_params(&params);

    for &lane in &cli.close_lanes {
        world
            .toggle_lane_closure(lane)
            .with_context(|| format!("cannot close lane {}", lane))?;
    }
    if cli.rush_hour {
        world.trigger_rush_hour();
    }

    run_headless(&mut world, &cli, &params);
    Ok(())
}

/// Run the simulation without graphics, reporting once per simulated second
fn run_headless(world: &mut SimWorld, cli: &Cli, params: &ParameterSet) {
    println!("Running highway simulation in headless mode...");
    println!(
        "Mode: {:?}, Ticks: {}, Delta: {}s",
        world.mode(),
        cli.ticks,
        cli.delta
    );

    // Calculate how many ticks equal 1 second of simulation time
    let ticks_per_second = ((1.0 / cli.delta).ceil() as u32).max(1);
    println!();

    println!("Initial state:");
    world.print_summary();
    if cli.map {
        world.draw_map();
    }
    println!();

    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_second.min(cli.ticks - tick);

        for _ in 0..ticks_to_run {
            if cli.emergency_at == Some(tick) {
                world.spawn_emergency_vehicle();
            }
            if let Some(every) = cli.on_ramp_every.filter(|&n| n > 0) {
                if tick % every == 0 {
                    world.spawn_on_ramp_vehicle();
                }
            }
            world.step(cli.delta, params);
            tick += 1;
        }

        println!(
            "--- After tick {} ({:.1}s simulated time) ---",
            tick, world.time
        );
        world.print_summary();
        if cli.map {
            world.draw_map();
        }
        println!();
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();
}
