//! Command-line launcher for the particle-field demos.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use particle_field::{Mode, Simulation, SimContext};

#[derive(Parser)]
#[command(name = "particle-field")]
#[command(about = "Particle clouds that morph into text or follow the pointer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Spiral cloud that morphs into a phrase on key press
    Morph {
        /// Font file used to draw phrases
        #[arg(long, env = "PARTICLE_FIELD_FONT")]
        font: Option<PathBuf>,

        /// Key to press once before the first frame
        #[arg(long, value_name = "KEY")]
        phrase_key: Option<char>,

        /// Write the raster of the phrase mapped to KEY as a PNG and continue
        #[arg(long, num_args = 2, value_names = ["KEY", "PATH"])]
        dump_mask: Option<Vec<String>>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Sphere of particles attracted to the pointer
    Touch {
        /// Seed for particle placement
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Radius of the spawn sphere
        #[arg(long, default_value_t = particle_field::spawn::DEFAULT_SPHERE_RADIUS)]
        radius: f32,

        /// Maximum initial speed per axis
        #[arg(long, default_value_t = particle_field::spawn::DEFAULT_VELOCITY_JITTER)]
        jitter: f32,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Number of particles
    #[arg(short = 'n', long, default_value_t = particle_field::simulation::DEFAULT_PARTICLE_COUNT)]
    particles: usize,

    /// Exit after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Step without opening a window and print summary statistics
    #[arg(long)]
    headless: bool,

    /// Frames to step in headless mode
    #[arg(long, default_value_t = 600)]
    frames: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the flags
    let mut logger = logger_builder(log_level(cli.verbose, cli.quiet));
    logger.parse_env(env_logger::Env::default());
    logger.init();

    let (sim, run) = match cli.command {
        Commands::Morph {
            font,
            phrase_key,
            dump_mask,
            run,
        } => {
            let mut sim = Simulation::new().with_mode(Mode::Morph);
            if let Some(font) = font {
                sim = sim.with_font(font);
            }
            if let Some(key) = phrase_key {
                sim = sim.with_initial_key(key);
            }
            if let Some(args) = dump_mask {
                let (key, path) = parse_dump_mask(&args)?;
                sim = sim.with_mask_export(key, path);
            }
            (sim, run)
        }
        Commands::Touch {
            seed,
            radius,
            jitter,
            run,
        } => {
            let sim = Simulation::new()
                .with_mode(Mode::Touch)
                .with_seed(seed)
                .with_sphere_radius(radius)
                .with_velocity_jitter(jitter);
            (sim, run)
        }
    };

    let mut sim = sim.with_particle_count(run.particles);
    if let Some(max) = run.max_frames {
        sim = sim.with_max_frames(max);
    }

    if run.headless {
        let ctx = sim
            .run_headless(run.frames)
            .context("Headless run failed")?;
        print_summary(&ctx, run.frames);
        return Ok(());
    }

    sim.run().context("Simulation failed")?;
    Ok(())
}

/// Log level selected by `-v`/`-q`. Defaults to `warn`.
fn log_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (verbose, quiet) {
        (0, true) => LevelFilter::Error,
        (0, false) => LevelFilter::Warn,
        (1, _) => LevelFilter::Info,
        (2, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn logger_builder(level: LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder
}

fn parse_dump_mask(args: &[String]) -> Result<(char, PathBuf)> {
    let [key, path] = args else {
        anyhow::bail!("--dump-mask expects KEY PATH");
    };
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok((c, PathBuf::from(path))),
        _ => anyhow::bail!("--dump-mask key must be a single character, got {key:?}"),
    }
}

fn print_summary(ctx: &SimContext, frames: u64) {
    let store = ctx.field.store();
    println!("Field:      {}", ctx.field.name());
    println!("Particles:  {}", store.len());
    println!("Frames:     {frames}");
    println!("Color:      #{:06x}", ctx.field.color());
    println!("Mean speed: {:.4}", store.mean_speed());
    if let Some(distance) = ctx.mean_target_distance() {
        println!("Mean distance to target: {distance:.3}");
    }
}
