use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness used for client-identity rotation and post-fetch delays.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`; `len` is never zero.
    fn index(&self, len: usize) -> usize;
    /// Uniform sample in `[0, 1)`.
    fn unit(&self) -> f64;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator shared by all workers.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        self.rng.lock().gen_range(0..len)
    }
    fn unit(&self) -> f64 {
        self.rng.lock().gen::<f64>()
    }
}
