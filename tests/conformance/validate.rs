use super::common::read_suite;
use escalation_paths::error::ErrorKind;
use escalation_paths::parse::SourceFormat;
use escalation_paths::validate::Validator;

/// A single validation test case from the suite.
#[derive(Debug, serde::Deserialize)]
struct TestCase {
    name: String,
    id: String,
    input: String,
    expected: Expected,
}

#[derive(Debug, serde::Deserialize)]
struct Expected {
    #[serde(default)]
    valid: Option<bool>,
    #[serde(default)]
    errors: Option<Vec<ExpectedError>>,
}

#[derive(Debug, serde::Deserialize)]
struct ExpectedError {
    kind: ErrorKind,
    #[serde(default)]
    path: Option<String>,
}

#[test]
fn validate_conformance_suite() {
    let content = read_suite("validate/suite.yaml");
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();
    assert!(!cases.is_empty(), "validate suite is empty");

    let validator = Validator::default();
    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        let result = validator.validate_source(&case.input, SourceFormat::Yaml);
        let mut case_ok = true;

        if let Some(true) = case.expected.valid {
            if !result.is_valid() {
                eprintln!(
                    "  FAIL [{}] {}: expected valid but got {} errors",
                    case.id,
                    case.name,
                    result.errors.len()
                );
                for err in &result.errors {
                    eprintln!("    - {}", err);
                }
                case_ok = false;
            }
        } else if let Some(expected_errors) = &case.expected.errors {
            if result.errors.len() != expected_errors.len() {
                eprintln!(
                    "  FAIL [{}] {}: expected {} errors, got {}",
                    case.id,
                    case.name,
                    expected_errors.len(),
                    result.errors.len()
                );
                case_ok = false;
            }
            for expected in expected_errors {
                let found = result.errors.iter().any(|e| {
                    e.kind == expected.kind
                        && expected
                            .path
                            .as_ref()
                            .is_none_or(|p| e.path.to_string() == *p)
                });
                if !found {
                    eprintln!(
                        "  FAIL [{}] {}: expected {} at {:?} not found",
                        case.id, case.name, expected.kind, expected.path
                    );
                    case_ok = false;
                }
            }
            if !case_ok {
                eprintln!("    Actual errors:");
                for e in &result.errors {
                    eprintln!("      - {}", e);
                }
            }
        } else {
            panic!("case [{}] declares no expectation", case.id);
        }

        if case_ok {
            passed += 1;
        } else {
            failed += 1;
        }
    }

    eprintln!(
        "Validate conformance: {} passed, {} failed ({} total)",
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} validate conformance cases failed", failed);
}
