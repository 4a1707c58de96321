//! RNG abstraction for runtime randomness
//!
//! Flicker episodes, ghost spawns and trunk dimensions draw from a `WorldRng`.
//! The session uses a seeded xoshiro generator so a run can be replayed;
//! tests can pass any `rand::Rng`. Tree placement has its own dedicated
//! generator (see `generation::ParkMillerRng`) because its exact sequence is
//! part of the world format.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Random number generator trait for the simulation
pub trait WorldRng {
    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Generate random f64 in [0.0, 1.0)
    fn gen_f64(&mut self) -> f64;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }
}

impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }

    fn gen_f64(&mut self) -> f64 {
        rand::Rng::r#gen(self)
    }
}

/// Session generator for runtime randomness
pub type SessionRng = Xoshiro256StarStar;

/// Seed the runtime generator; distinct from the placement stream for the same seed
pub fn session_rng(seed: u64) -> SessionRng {
    Xoshiro256StarStar::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_rng_gen_f32() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            let val = rng.gen_f32();
            assert!(val >= 0.0);
            assert!(val < 1.0);
        }
    }

    #[test]
    fn test_world_rng_gen_f64() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            let val = rng.gen_f64();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_world_rng_check_probability_always_true() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            assert!(rng.check_probability(1.0));
        }
    }

    #[test]
    fn test_world_rng_check_probability_always_false() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            assert!(!rng.check_probability(0.0));
        }
    }

    #[test]
    fn test_session_rng_deterministic() {
        let mut rng1 = session_rng(42);
        let mut rng2 = session_rng(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_f32(), rng2.gen_f32());
        }
    }

    #[test]
    fn test_session_rng_differs_by_seed() {
        let mut rng1 = session_rng(1);
        let mut rng2 = session_rng(2);
        let a: Vec<f64> = (0..8).map(|_| rng1.gen_f64()).collect();
        let b: Vec<f64> = (0..8).map(|_| rng2.gen_f64()).collect();
        assert_ne!(a, b);
    }
}
