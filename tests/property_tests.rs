use bonded_fit::boltzmann::invert;
use proptest::prelude::*;

// --- STRATEGIES ---

prop_compose! {
    fn arb_samples()(
        values in prop::collection::vec(-5.0..5.0f64, 1..200)
    ) -> Vec<f64> {
        values
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn profile_is_well_formed(
        samples in arb_samples(),
        increment in 0.01..0.5f64,
        temperature in 100.0..500.0f64,
    ) {
        let profile = invert(&samples, increment, temperature).unwrap();

        prop_assert_eq!(profile.coords.len(), profile.energies.len());
        prop_assert!(!profile.is_empty());
        prop_assert!(profile.coords.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(profile.energies.iter().all(|&e| e >= 0.0 && e.is_finite()));
        prop_assert!(profile.energies.iter().any(|&e| e == 0.0));
    }

    #[test]
    fn inversion_ignores_sample_order(
        samples in arb_samples(),
        increment in 0.01..0.5f64,
    ) {
        let mut reversed = samples.clone();
        reversed.reverse();
        prop_assert_eq!(
            invert(&samples, increment, 298.0).unwrap(),
            invert(&reversed, increment, 298.0).unwrap()
        );
    }
}
