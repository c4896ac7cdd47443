//! Ensemble maximum aggregation.

use proptest::prelude::*;
use roofline::{EnsembleMax, TrialAggregate};

fn with_rate(flop_rate: f64) -> TrialAggregate {
    TrialAggregate {
        flop_rate,
        ..Default::default()
    }
}

#[test]
fn running_max_over_5_3_9_2() {
    let mut ensemble = EnsembleMax::new();
    let seen: Vec<f64> = [5.0, 3.0, 9.0, 2.0]
        .into_iter()
        .map(|r| ensemble.observe(&with_rate(r)).flop_rate)
        .collect();
    assert_eq!(seen, vec![5.0, 5.0, 9.0, 9.0]);
}

proptest! {
    #[test]
    fn observed_max_never_decreases(rates in prop::collection::vec(0.0f64..1e12, 1..32)) {
        let mut ensemble = EnsembleMax::new();
        let mut previous = 0.0;
        for &rate in &rates {
            let current = ensemble.observe(&with_rate(rate)).flop_rate;
            prop_assert!(current >= previous);
            prop_assert!(current >= rate);
            previous = current;
        }
        let expected = rates.iter().cloned().fold(0.0, f64::max);
        prop_assert_eq!(ensemble.value().flop_rate, expected);
        prop_assert_eq!(ensemble.count(), rates.len());
    }
}
