use clap::Parser;
use log::{error, info, warn};
use std::process;
use tankar::config;
use tankar::logging;
use tankar::pool::GrowthPolicy;
use tankar::skirmish::{Skirmish, SkirmishSettings};

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Headless AR tank skirmish", long_about = None)]
struct Args {
    /// Number of tanks to place before the fight starts.
    #[arg(long, default_value_t = config::DEFAULT_SKIRMISH_TANKS)]
    tanks: u32,

    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = config::DEFAULT_MAX_FRAMES)]
    frames: u32,

    /// Random seed for tank placement and control. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Let the tank and rocket pools grow instead of refusing when exhausted.
    #[arg(long)]
    grow_pools: bool,

    /// Debug filter to specify log topics (e.g., "pool,rocket")
    /// Available topics: pool, tank, rocket, input, game
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // RUST_LOG takes over from the topic logger when set
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::init();
    } else if let Err(e) = logging::init_logger(logging::parse_level(&args.log_level), args.debug_filter.clone()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    if let Some(filter) = &args.debug_filter {
        for topic in logging::parse_debug_filter(filter) {
            if !logging::TOPICS.contains(&topic.as_str()) {
                warn!("Unknown debug topic '{}'", topic);
            }
        }
    }

    let settings = SkirmishSettings {
        tanks: args.tanks,
        max_frames: args.frames,
        seed: args.seed.unwrap_or_else(rand::random),
        growth: if args.grow_pools {
            GrowthPolicy::GrowOnDemand
        } else {
            GrowthPolicy::Fixed
        },
    };
    info!("Starting skirmish with seed {}", settings.seed);

    let mut skirmish = match Skirmish::new(settings) {
        Ok(skirmish) => skirmish,
        Err(e) => {
            error!("Invalid pool configuration: {}", e);
            process::exit(1);
        }
    };
    let result = skirmish.run();

    match result.winner {
        Some(winner) => info!("Tank {} wins!", winner),
        None if result.counts.alive == 0 => info!("Draw! No tank survived."),
        None => info!("No winner after {} frames.", result.frames),
    }
    info!(
        "Tanks alive: {}, destroyed: {}, rockets fired: {}, dry fires: {}",
        result.counts.alive, result.counts.destroyed, result.rockets_fired, result.dry_fires
    );
}
