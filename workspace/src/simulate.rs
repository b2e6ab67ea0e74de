use std::path::PathBuf;
use anyhow::{ Context, Result };
use clap::{ Parser, ValueEnum };
use tracing::{ info, warn, Level };
use cnwell::{
    config::{ BoundaryMode, SimConfig },
    propagator::Solver,
    sim::{ Simulation, Tick },
};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    /// 256-node line, out to T = 10
    Box1d,
    /// 32 × 32 square, out to T = 1
    Box2d,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Boundary {
    Penalty,
    Eliminated,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SolverArg {
    Banded,
    Dense,
}

/// Propagate a Gaussian wave packet in an infinite square well with the
/// Crank-Nicolson scheme.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in configuration to start from
    #[arg(short, long, value_enum, default_value = "box1d")]
    preset: Preset,

    /// Override the total number of steps
    #[arg(long)]
    steps: Option<usize>,

    /// Log progress every this many steps
    #[arg(long, default_value_t = 1000)]
    report_every: usize,

    /// Override the boundary treatment
    #[arg(long, value_enum)]
    boundary: Option<Boundary>,

    /// Override the linear solver
    #[arg(long, value_enum)]
    solver: Option<SolverArg>,

    /// Print the resolved configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// More output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }

    fn resolve_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => match self.preset {
                Preset::Box1d => SimConfig::box_1d(),
                Preset::Box2d => SimConfig::box_2d(),
            },
        };
        if let Some(steps) = self.steps { config.steps = steps; }
        if let Some(boundary) = self.boundary {
            config.boundary = match boundary {
                Boundary::Penalty => BoundaryMode::Penalty,
                Boundary::Eliminated => BoundaryMode::Eliminated,
            };
        }
        if let Some(solver) = self.solver {
            config.solver = match solver {
                SolverArg::Banded => Solver::Banded,
                SolverArg::Dense => Solver::Dense,
            };
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.level())
        .with_target(false)
        .init();

    let config = args.resolve_config()?;
    if args.dump_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let report_every = args.report_every.max(1);
    let mut sim
        = Simulation::initialize(config)
        .context("failed to set up simulation")?;
    loop {
        match sim.tick().context("simulation failed")? {
            Tick::Advanced => {
                let step = sim.step_index();
                if step % report_every == 0 {
                    let peak
                        = sim.current_density().iter()
                        .copied()
                        .fold(0.0_f64, f64::max);
                    info!(
                        step,
                        time = sim.current_time(),
                        norm = sim.norm(),
                        peak_density = peak,
                        "progress"
                    );
                }
            },
            Tick::Complete => { break; },
            Tick::Paused => {
                warn!(step = sim.step_index(), "simulation paused with no driver to resume it");
                break;
            },
        }
    }
    info!(
        steps = sim.step_index(),
        time = sim.current_time(),
        norm = sim.norm(),
        "done"
    );
    Ok(())
}
