//! RNG trait abstraction for the grid update
//!
//! Allows the resolvers to work with both:
//! - seeded `Xoshiro256StarStar` streams (reproducible runs, one per row in parallel mode)
//! - scripted doubles in unit tests

/// Random number generator trait for the grid update
pub trait WorldRng {
    /// Generate random boolean with 50% probability
    fn gen_bool(&mut self) -> bool;

    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Check if random value is less than probability threshold
    fn check_probability(&mut self, probability: f32) -> bool {
        self.gen_f32() < probability
    }

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn gen_index(&mut self, len: usize) -> usize {
        ((self.gen_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

// Blanket implementation for any type implementing rand::Rng
impl<T: ?Sized + rand::Rng> WorldRng for T {
    fn gen_bool(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }

    fn gen_f32(&mut self) -> f32 {
        rand::Rng::r#gen(self)
    }

    fn gen_index(&mut self, len: usize) -> usize {
        rand::Rng::gen_range(self, 0..len.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn test_world_rng_gen_bool() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        let mut seen_true = false;
        let mut seen_false = false;

        for _ in 0..100 {
            if rng.gen_bool() {
                seen_true = true;
            } else {
                seen_false = true;
            }
        }

        assert!(seen_true);
        assert!(seen_false);
    }

    #[test]
    fn test_world_rng_check_probability_bounds() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(12345);

        for _ in 0..100 {
            assert!(rng.check_probability(1.0));
            assert!(!rng.check_probability(0.0));
        }
    }

    #[test]
    fn test_gen_index_covers_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        let mut seen = [false; 3];

        for _ in 0..200 {
            let i = rng.gen_index(3);
            assert!(i < 3);
            seen[i] = true;
        }

        assert_eq!(seen, [true; 3]);
    }

    /// Only implements the required methods, so `gen_index` uses the default
    struct FixedRng(f32);

    impl WorldRng for FixedRng {
        fn gen_bool(&mut self) -> bool {
            false
        }

        fn gen_f32(&mut self) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_default_gen_index_stays_in_range() {
        assert_eq!(FixedRng(0.0).gen_index(3), 0);
        assert_eq!(FixedRng(0.5).gen_index(3), 1);
        assert_eq!(FixedRng(0.999_999).gen_index(3), 2);
        assert_eq!(FixedRng(0.7).gen_index(1), 0);
    }

    #[test]
    fn test_world_rng_deterministic() {
        let mut rng1 = Xoshiro256StarStar::seed_from_u64(42);
        let mut rng2 = Xoshiro256StarStar::seed_from_u64(42);

        for _ in 0..100 {
            assert_eq!(rng1.gen_f32(), rng2.gen_f32());
            assert_eq!(rng1.gen_index(5), rng2.gen_index(5));
        }
    }
}
