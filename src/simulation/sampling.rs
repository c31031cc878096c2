//! Random sampling helpers
//!
//! Every actor owns its own seeded generator. Seeds are derived from the run
//! seed and a stream number:
//!
//!   seed = run_seed XOR (stream * MIXING_CONSTANT)
//!
//! so actors never share generator state and adding actors does not disturb
//! the streams of existing ones.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Above this rate Poisson draws use the normal approximation
const POISSON_NORMAL_THRESHOLD: f64 = 30.0;

/// Seed for stream `stream` of the run seeded with `run_seed`
pub fn derive_seed(run_seed: u64, stream: u64) -> u64 {
    run_seed ^ stream.wrapping_mul(MIXING_CONSTANT)
}

/// Generator for stream `stream` of the run seeded with `run_seed`
pub fn stream_rng(run_seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(derive_seed(run_seed, stream))
}

/// Exponentially distributed duration in whole minutes, at least 1
pub fn exponential_minutes<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> u64 {
    if !(mean > 0.0) {
        return 1;
    }
    let u: f64 = rng.gen();
    let sample = -mean * (1.0 - u).ln();
    (sample.round() as u64).max(1)
}

/// Poisson distributed count with rate `lambda`
pub fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    if !(lambda > 0.0) {
        return 0;
    }
    if lambda > POISSON_NORMAL_THRESHOLD {
        // Box-Muller
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        return (lambda + z * lambda.sqrt()).round().max(0.0) as u64;
    }

    // Knuth
    let limit = (-lambda).exp();
    let mut count = 0;
    let mut product: f64 = rng.gen();
    while product > limit {
        count += 1;
        product *= rng.gen::<f64>();
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_seeds_differ_per_stream() {
        assert_ne!(derive_seed(42, 1), derive_seed(42, 2));
        assert_eq!(derive_seed(42, 0), 42);
        let a: u64 = stream_rng(7, 3).gen();
        let b: u64 = stream_rng(7, 3).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exponential_floors_at_one() {
        let mut rng = stream_rng(1, 1);
        for _ in 0..1_000 {
            assert!(exponential_minutes(&mut rng, 0.01) >= 1);
        }
        assert_eq!(exponential_minutes(&mut rng, 0.0), 1);
        assert_eq!(exponential_minutes(&mut rng, f64::NAN), 1);
    }

    #[test]
    fn test_exponential_mean_is_close() {
        let mut rng = stream_rng(2, 1);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| exponential_minutes(&mut rng, 50.0)).sum();
        let mean = total as f64 / n as f64;
        assert!((45.0..55.0).contains(&mean), "mean was {}", mean);
    }

    #[test]
    fn test_poisson_means() {
        let mut rng = stream_rng(3, 1);
        let n = 20_000;
        for lambda in [0.5, 4.0, 80.0] {
            let total: u64 = (0..n).map(|_| poisson(&mut rng, lambda)).sum();
            let mean = total as f64 / n as f64;
            assert!((mean - lambda).abs() < lambda * 0.1 + 0.05, "lambda {} gave {}", lambda, mean);
        }
        assert_eq!(poisson(&mut rng, 0.0), 0);
        assert_eq!(poisson(&mut rng, -1.0), 0);
    }
}
