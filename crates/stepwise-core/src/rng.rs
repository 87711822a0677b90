//! Random source injection.
//!
//! Randomized engines are generic over `R: rand::Rng + ?Sized` so tests
//! can pass a fixed-seed generator. The only place a non-deterministic
//! seed is drawn is [`resolve_seed`], called at the outermost entry point
//! so the seed actually used can be stored in the run's metadata.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The generator engines use when driven through
/// [`Engine::simulate`](crate::Engine::simulate).
pub type EngineRng = ChaCha8Rng;

/// Use the configured seed, or draw a fresh one from the thread RNG.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::rng().random())
}

/// A deterministic generator for `seed`.
pub fn seeded(seed: u64) -> EngineRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Pick an index in `0..len` uniformly. `len` must be non-zero.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    rng.random_range(0..len)
}
