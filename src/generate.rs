//! Seeded synthetic workloads.
//!
//! Generation is deterministic for a given seed, so a failing stress case
//! can be reproduced from its seed alone.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::process::ProcessDef;

/// Bounds for generated processes. All ranges are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct GenParams {
    pub max_arrival: u64,
    pub burst: (u64, u64),
    pub burst_count: (u32, u32),
    pub io: (u64, u64),
}

impl Default for GenParams {
    fn default() -> Self {
        GenParams {
            max_arrival: 500,
            burst: (1, 400),
            burst_count: (1, 8),
            io: (0, 800),
        }
    }
}

/// Letters-only pid for the `n`th process: `A`..`Z`, then `AA`, `AB`, ...
pub fn pid_name(mut n: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Generate `count` processes with the default bounds.
pub fn generate(count: usize, seed: u64) -> Vec<ProcessDef> {
    generate_with(count, seed, &GenParams::default())
}

pub fn generate_with(count: usize, seed: u64, params: &GenParams) -> Vec<ProcessDef> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|n| {
            let burst_count = rng.gen_range(params.burst_count.0..=params.burst_count.1);
            let io = if burst_count > 1 {
                rng.gen_range(params.io.0..=params.io.1)
            } else {
                0
            };
            ProcessDef::new(
                pid_name(n),
                rng.gen_range(0..=params.max_arrival),
                rng.gen_range(params.burst.0..=params.burst.1),
                burst_count,
                io,
            )
        })
        .collect()
}
