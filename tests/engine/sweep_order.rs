//! Vector-length sequence properties.

use proptest::prelude::*;
use roofline::{RooflineConfig, VectorLengths};

#[test]
fn doubling_from_8_to_100() {
    let lengths: Vec<_> = VectorLengths::new(8, 100, 2.0).collect();
    assert_eq!(lengths, vec![8, 16, 32, 64, 128]);
}

#[test]
fn default_config_sweep_ends_past_one_million() {
    let lengths: Vec<_> = VectorLengths::from_config(&RooflineConfig::default()).collect();
    assert_eq!(lengths.first(), Some(&16));
    assert_eq!(lengths.last(), Some(&1_048_576));
}

proptest! {
    #[test]
    fn lengths_strictly_increase_and_stop_at_end(
        start in 1usize..1000,
        span in 0usize..100_000,
        scale in 1.01f64..4.0,
    ) {
        let end = start + span;
        let lengths: Vec<_> = VectorLengths::new(start, end, scale).collect();

        prop_assert_eq!(lengths[0], start);
        prop_assert!(lengths.windows(2).all(|w| w[0] < w[1]));
        // every length but the last is below the bound; the last reaches it
        let (last, rest) = lengths.split_last().unwrap();
        prop_assert!(*last >= end);
        prop_assert!(rest.iter().all(|&n| n < end));
    }
}
