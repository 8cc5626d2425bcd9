use escalation_paths::text::WrapHeuristic;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    // Text without a newline is never flagged, however long.
    #[test]
    fn single_line_never_flagged(text in "[a-zA-Z ,.:()]{0,400}") {
        let h = WrapHeuristic::default();
        prop_assert_eq!(h.suspicious_breaks(&text), 0);
        prop_assert!(!h.is_wrapped(&text));
    }

    // Bulleted lines are not prose, whatever their length.
    #[test]
    fn bullet_lists_never_flagged(
        items in prop::collection::vec("[a-z][a-z ]{60,90}[a-z]", 2..8),
    ) {
        let text = items
            .iter()
            .map(|item| format!("- {}", item))
            .collect::<Vec<_>>()
            .join("\n");
        prop_assert!(!WrapHeuristic::default().is_wrapped(&text));
    }

    // Lines that end a sentence are never suspicious breaks.
    #[test]
    fn sentence_per_line_never_flagged(
        lines in prop::collection::vec("[a-z][a-z ]{60,85}[a-z]", 2..8),
    ) {
        let text = lines
            .iter()
            .map(|line| format!("{}.", line))
            .collect::<Vec<_>>()
            .join("\n");
        prop_assert_eq!(WrapHeuristic::default().suspicious_breaks(&text), 0);
    }

    // Prose lines inside a code fence are ignored.
    #[test]
    fn fenced_code_never_flagged(
        lines in prop::collection::vec("[a-z][a-z ]{60,85}[a-z]", 2..8),
    ) {
        let text = format!("```\n{}\n```", lines.join("\n"));
        prop_assert!(!WrapHeuristic::default().is_wrapped(&text));
    }
}
