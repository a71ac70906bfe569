use crate::config::GenomeBounds;
use crate::engines::evaluation::Individual;
use crate::engines::generation::genome::Genome;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Standard deviation of Gaussian mutation, as a fraction of the field range.
pub const MUTATION_SCALE: f64 = 0.15;

const LAG_STEPS: [i64; 3] = [-1, 0, 1];
const MAX_HOLD_STEPS: [i64; 5] = [-2, -1, 0, 1, 2];

/// Generate a random genome uniformly inside the bounds, then repair it
pub fn random_genome<R: Rng>(bounds: &GenomeBounds, rng: &mut R) -> Genome {
    let genome = Genome {
        threshold: rng.gen_range(bounds.threshold.0..=bounds.threshold.1),
        take_profit: rng.gen_range(bounds.take_profit.0..=bounds.take_profit.1),
        stop_loss: rng.gen_range(bounds.stop_loss.0..=bounds.stop_loss.1),
        lag: rng.gen_range(bounds.lag.0..=bounds.lag.1),
        max_hold: rng.gen_range(bounds.max_hold.0..=bounds.max_hold.1),
    };
    repair(genome, bounds)
}

fn clamp_f64(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

fn clamp_steps(value: i64, (lo, hi): (usize, usize)) -> usize {
    value.max(lo as i64).min(hi as i64) as usize
}

/// Clamp every field into its bounds and widen the stop to the profit target
/// when it is tighter. Idempotent.
pub fn repair(mut genome: Genome, bounds: &GenomeBounds) -> Genome {
    genome.threshold = clamp_f64(genome.threshold, bounds.threshold);
    genome.take_profit = clamp_f64(genome.take_profit, bounds.take_profit);
    genome.stop_loss = clamp_f64(genome.stop_loss, bounds.stop_loss);

    if genome.stop_loss.abs() < genome.take_profit {
        genome.stop_loss = clamp_f64(-genome.take_profit, bounds.stop_loss);
    }

    genome.lag = clamp_steps(genome.lag as i64, bounds.lag);
    genome.max_hold = clamp_steps(genome.max_hold as i64, bounds.max_hold);

    genome
}

/// Arithmetic-mean crossover for continuous fields, uniform choice for the
/// integer fields
pub fn crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    bounds: &GenomeBounds,
    rng: &mut R,
) -> Genome {
    let child = Genome {
        threshold: 0.5 * (parent1.threshold + parent2.threshold),
        take_profit: 0.5 * (parent1.take_profit + parent2.take_profit),
        stop_loss: 0.5 * (parent1.stop_loss + parent2.stop_loss),
        lag: if rng.gen_bool(0.5) { parent1.lag } else { parent2.lag },
        max_hold: if rng.gen_bool(0.5) {
            parent1.max_hold
        } else {
            parent2.max_hold
        },
    };
    repair(child, bounds)
}

fn gaussian_step<R: Rng>(range: f64, rng: &mut R) -> f64 {
    match Normal::new(0.0, MUTATION_SCALE * range) {
        Ok(normal) => normal.sample(rng),
        Err(_) => 0.0,
    }
}

fn integer_step<R: Rng>(steps: &[i64], rng: &mut R) -> i64 {
    steps.choose(rng).copied().unwrap_or(0)
}

/// Mutation: each field is perturbed independently with probability `mutation_rate`
pub fn mutate<R: Rng>(
    genome: &Genome,
    mutation_rate: f64,
    bounds: &GenomeBounds,
    rng: &mut R,
) -> Genome {
    let rate = mutation_rate.clamp(0.0, 1.0);
    let mut g = *genome;

    if rng.gen::<f64>() < rate {
        g.threshold += gaussian_step(bounds.threshold_range(), rng);
    }
    if rng.gen::<f64>() < rate {
        g.take_profit += gaussian_step(bounds.take_profit_range(), rng);
    }
    if rng.gen::<f64>() < rate {
        g.stop_loss += gaussian_step(bounds.stop_loss_range(), rng);
    }
    if rng.gen::<f64>() < rate {
        g.lag = clamp_steps(g.lag as i64 + integer_step(&LAG_STEPS, rng), bounds.lag);
    }
    if rng.gen::<f64>() < rate {
        g.max_hold = clamp_steps(
            g.max_hold as i64 + integer_step(&MAX_HOLD_STEPS, rng),
            bounds.max_hold,
        );
    }

    repair(g, bounds)
}

/// Tournament selection: best of K candidates drawn without replacement
pub fn tournament_selection<'a, R: Rng>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual> {
    let k = tournament_size.clamp(1, population.len().max(1));
    population
        .choose_multiple(rng, k)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> GenomeBounds {
        GenomeBounds::default()
    }

    #[test]
    fn test_random_genome_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let b = bounds();
        for _ in 0..1000 {
            let g = random_genome(&b, &mut rng);
            assert!(b.check(&g).is_ok(), "{:?}", g);
        }
    }

    #[test]
    fn test_repair_widens_tight_stop() {
        let g = Genome {
            threshold: -0.01,
            take_profit: 0.035,
            stop_loss: -0.025,
            lag: 1,
            max_hold: 5,
        };
        let repaired = repair(g, &bounds());
        assert!((repaired.stop_loss + 0.035).abs() < 1e-12);
    }

    #[test]
    fn test_repair_clamps_out_of_range_fields() {
        let g = Genome {
            threshold: 0.5,
            take_profit: 1.0,
            stop_loss: -1.0,
            lag: 40,
            max_hold: 0,
        };
        let b = bounds();
        let repaired = repair(g, &b);
        assert_eq!(repaired.threshold, b.threshold.1);
        assert_eq!(repaired.take_profit, b.take_profit.1);
        assert_eq!(repaired.stop_loss, b.stop_loss.0);
        assert_eq!(repaired.lag, b.lag.1);
        assert_eq!(repaired.max_hold, b.max_hold.0);
    }

    #[test]
    fn test_repair_handles_nan() {
        let g = Genome {
            threshold: f64::NAN,
            take_profit: 0.02,
            stop_loss: -0.03,
            lag: 1,
            max_hold: 5,
        };
        let repaired = repair(g, &bounds());
        assert!(repaired.threshold.is_finite());
    }

    #[test]
    fn test_crossover_averages_continuous_fields() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = Genome {
            threshold: -0.02,
            take_profit: 0.02,
            stop_loss: -0.04,
            lag: 0,
            max_hold: 3,
        };
        let b = Genome {
            threshold: -0.01,
            take_profit: 0.03,
            stop_loss: -0.05,
            lag: 3,
            max_hold: 15,
        };
        let child = crossover(&a, &b, &bounds(), &mut rng);
        assert!((child.threshold + 0.015).abs() < 1e-12);
        assert!((child.take_profit - 0.025).abs() < 1e-12);
        assert!((child.stop_loss + 0.045).abs() < 1e-12);
        assert!(child.lag == 0 || child.lag == 3);
        assert!(child.max_hold == 3 || child.max_hold == 15);
    }

    #[test]
    fn test_zero_rate_mutation_is_identity_after_repair() {
        let mut rng = StdRng::seed_from_u64(3);
        let b = bounds();
        let g = random_genome(&b, &mut rng);
        assert_eq!(mutate(&g, 0.0, &b, &mut rng), g);
    }

    #[test]
    fn test_full_rate_mutation_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let b = bounds();
        let mut g = random_genome(&b, &mut rng);
        for _ in 0..500 {
            g = mutate(&g, 1.0, &b, &mut rng);
            assert!(b.check(&g).is_ok(), "{:?}", g);
        }
    }
}
