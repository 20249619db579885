//! Random fixture names and versions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Upper bound (inclusive) of the numeric suffix appended by [`IdentGenerator::random_name`].
pub const NAME_SUFFIX_MAX: u32 = 1_000_000;
/// Upper bound (inclusive) of each component produced by [`IdentGenerator::random_vsn`].
pub const VSN_COMPONENT_MAX: u32 = 100;

/// Source of unique-enough identifiers for fixture isolation.
///
/// The generator owns its RNG; callers pick between a fixed seed (reruns
/// produce the same names) and an entropy seed (fresh names per run). There
/// is no process-wide seeding.
#[derive(Debug, Clone)]
pub struct IdentGenerator {
    rng: StdRng,
}

impl IdentGenerator {
    /// Creates a deterministic generator from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Returns `prefix` followed by a number in `1..=1_000_000`.
    pub fn random_name(&mut self, prefix: &str) -> String {
        let suffix = self.rng.gen_range(1..=NAME_SUFFIX_MAX);
        format!("{prefix}{suffix}")
    }

    /// Returns a three component version such as `"12.7.93"`.
    pub fn random_vsn(&mut self) -> String {
        let mut part = || self.rng.gen_range(1..=VSN_COMPONENT_MAX);
        let (major, minor, patch) = (part(), part(), part());
        format!("{major}.{minor}.{patch}")
    }
}
