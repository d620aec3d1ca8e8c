use clap::Parser;

use crate::particle::{MAX_PARTICLES, PARTICLE_COUNT};

/// Moving colored points, advanced by a compute pass and drawn by a render pass
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Total particles
    #[arg(
        short,
        long,
        default_value_t = PARTICLE_COUNT,
        value_parser = clap::value_parser!(u32).range(1..=MAX_PARTICLES as i64),
    )]
    pub particles: u32,

    /// Seed for spawning particles
    ///
    /// if omitted every run spawns a different swarm
    #[arg(short, long)]
    pub seed: Option<u64>,
}
