use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn next_delay_stays_within_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let bounds = [
        (Duration::ZERO, Duration::ZERO),
        (Duration::from_millis(10), Duration::from_secs(1)),
        (Duration::from_millis(1), Duration::from_millis(170)),
        (Duration::from_millis(50), Duration::from_millis(50)),
    ];
    for (min, max) in bounds {
        for _ in 0..10_000 {
            let d = next_delay(min, max, &mut rng);
            assert!(d >= min && d <= max, "{d:?} outside [{min:?}, {max:?}]");
        }
    }
}

#[test]
fn next_delay_is_biased_towards_short_delays() {
    let mut rng = StdRng::seed_from_u64(1);
    let (min, max) = (Duration::from_millis(10), Duration::from_secs(1));
    let samples: Vec<Duration> = (0..5_000).map(|_| next_delay(min, max, &mut rng)).collect();
    let short = samples
        .iter()
        .filter(|d| **d < Duration::from_millis(100))
        .count();
    assert!(short > 4_500, "only {short} short delays");
}

#[test]
fn seeded_pacers_are_deterministic() {
    let mk = || Pacer::new(PacingConfig::default(), StdRng::seed_from_u64(42)).unwrap();
    let (mut a, mut b) = (mk(), mk());
    for _ in 0..100 {
        assert_eq!(
            a.delay_after(StepKind::Whitespace),
            b.delay_after(StepKind::Whitespace)
        );
    }
}

#[test]
fn pauses_only_follow_whitespace() {
    let config = PacingConfig {
        pause_probability: 1.0,
        ..PacingConfig::instant()
    };
    let config = PacingConfig {
        pause_min: Duration::from_millis(200),
        pause_max: Duration::from_millis(500),
        ..config
    };
    let mut pacer = Pacer::new(config, StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(pacer.delay_after(StepKind::Typed), Duration::ZERO);
    assert_eq!(pacer.delay_after(StepKind::Erased), Duration::ZERO);
    let d = pacer.delay_after(StepKind::Whitespace);
    assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(500));
}

#[test]
fn instant_pacing_never_waits() {
    let mut pacer = Pacer::new(PacingConfig::instant(), StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(pacer.initial_delay(), Duration::ZERO);
    assert_eq!(pacer.delay_after(StepKind::Whitespace), Duration::ZERO);
}

#[test]
fn invalid_configs_are_rejected() {
    let inverted = PacingConfig {
        min_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(1),
        ..PacingConfig::default()
    };
    assert!(inverted.validate().is_err());

    let bad_prob = PacingConfig {
        pause_probability: 1.5,
        ..PacingConfig::default()
    };
    assert!(Pacer::new(bad_prob, StdRng::seed_from_u64(0)).is_err());
}
