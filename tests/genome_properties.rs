use leadlag::config::GenomeBounds;
use leadlag::engines::generation::operators::{crossover, mutate, random_genome, repair};
use leadlag::Genome;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_sampled_genomes_are_valid() {
    let bounds = GenomeBounds::default();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..10_000 {
        let genome = random_genome(&bounds, &mut rng);
        assert!(bounds.check(&genome).is_ok(), "{:?}", genome);
        assert!(genome.validate().is_ok(), "{:?}", genome);
        assert!(genome.stop_loss.abs() >= genome.take_profit);
    }
}

#[test]
fn test_offspring_stay_in_bounds() {
    let bounds = GenomeBounds::default();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..2_000 {
        let a = random_genome(&bounds, &mut rng);
        let b = random_genome(&bounds, &mut rng);
        let child = crossover(&a, &b, &bounds, &mut rng);
        let mutant = mutate(&child, 0.5, &bounds, &mut rng);

        assert!(bounds.check(&child).is_ok(), "{:?}", child);
        assert!(bounds.check(&mutant).is_ok(), "{:?}", mutant);
    }
}

#[test]
fn test_repair_is_idempotent_on_arbitrary_input() {
    let bounds = GenomeBounds::default();
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..5_000 {
        let raw = Genome {
            threshold: rng.gen_range(-1.0..1.0),
            take_profit: rng.gen_range(-1.0..1.0),
            stop_loss: rng.gen_range(-1.0..1.0),
            lag: rng.gen_range(0..50),
            max_hold: rng.gen_range(0..50),
        };
        let once = repair(raw, &bounds);
        assert_eq!(repair(once, &bounds), once);
        assert!(bounds.check(&once).is_ok(), "{:?} -> {:?}", raw, once);
    }
}

#[test]
fn test_custom_bounds_are_respected() {
    let bounds = GenomeBounds {
        threshold: (-0.02, -0.01),
        take_profit: (0.01, 0.02),
        stop_loss: (-0.05, -0.03),
        lag: (2, 2),
        max_hold: (4, 6),
    };
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..1_000 {
        let genome = mutate(&random_genome(&bounds, &mut rng), 1.0, &bounds, &mut rng);
        assert_eq!(genome.lag, 2);
        assert!((4..=6).contains(&genome.max_hold));
    }
}

#[test]
fn test_genome_json_accepts_short_field_names() {
    let json = r#"{"threshold": -0.01, "tp": 0.02, "sl": -0.03, "lag": 1, "max_hold": 10}"#;
    let genome: Genome = serde_json::from_str(json).unwrap();

    assert_eq!(genome.take_profit, 0.02);
    assert_eq!(genome.stop_loss, -0.03);

    let long = serde_json::to_string(&genome).unwrap();
    assert!(long.contains("take_profit"));
}
