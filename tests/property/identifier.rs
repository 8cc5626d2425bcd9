use escalation_paths::error::{ErrorKind, FieldPath};
use escalation_paths::primitives::validate_identifier;
use proptest::prelude::*;

fn path() -> FieldPath {
    FieldPath::field("id")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Any alphanumeric service with exactly three digits is accepted.
    #[test]
    fn well_formed_ids_accepted(
        service in "[A-Za-z0-9]{1,12}",
        number in 0u32..1000,
    ) {
        let id = format!("{}-{:03}", service, number);
        prop_assert!(validate_identifier(&id, &path()).is_ok(), "rejected {}", id);
    }

    // Any digit count other than three is rejected.
    #[test]
    fn wrong_digit_count_rejected(
        service in "[a-z]{1,8}",
        digits in prop_oneof!["[0-9]{1,2}", "[0-9]{4,6}"],
    ) {
        let id = format!("{}-{}", service, digits);
        let err = validate_identifier(&id, &path()).unwrap_err();
        prop_assert_eq!(err.kind, ErrorKind::FormatViolation);
        prop_assert!(err.message.contains("3 digits"), "{}", err.message);
    }

    // A separator-free string never matches.
    #[test]
    fn missing_separator_rejected(s in "[A-Za-z0-9]{1,16}") {
        prop_assert!(validate_identifier(&s, &path()).is_err());
    }
}
