use escalation_paths::error::{ErrorKind, FieldPath};
use escalation_paths::primitives::check_sequential;
use proptest::prelude::*;

/// A permutation of `1..=n` for some `n` in `1..=12`.
fn arb_permutation() -> impl Strategy<Value = Vec<i64>> {
    (1i64..=12)
        .prop_flat_map(|n| Just((1..=n).collect::<Vec<i64>>()).prop_shuffle())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // Source order of step numbers never matters.
    #[test]
    fn permutations_accepted(numbers in arb_permutation()) {
        prop_assert!(
            check_sequential(&numbers, None, &FieldPath::field("exploitationSteps")).is_ok(),
            "rejected {:?}", numbers
        );
    }

    // Replacing any step number with a duplicate of another breaks the sequence.
    #[test]
    fn duplicates_rejected(
        numbers in arb_permutation().prop_filter("need two steps", |v| v.len() >= 2),
        (a, b) in (0usize..12, 0usize..12),
    ) {
        let len = numbers.len();
        let (a, b) = (a % len, b % len);
        prop_assume!(a != b);
        let mut numbers = numbers;
        numbers[a] = numbers[b];
        let err = check_sequential(&numbers, Some("awscli"), &FieldPath::field("exploitationSteps"))
            .unwrap_err();
        prop_assert_eq!(err.kind, ErrorKind::SequenceViolation);
        prop_assert!(err.message.starts_with("tool 'awscli' "), "{}", err.message);
    }

    // Shifting the whole range off 1 is rejected.
    #[test]
    fn offset_ranges_rejected(numbers in arb_permutation(), offset in 1i64..5) {
        let shifted: Vec<i64> = numbers.iter().map(|n| n + offset).collect();
        prop_assert!(check_sequential(&shifted, None, &FieldPath::root()).is_err());
    }
}
