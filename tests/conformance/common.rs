use std::path::PathBuf;

/// Root of the conformance fixtures. `ESCALATION_PATHS_CONFORMANCE_DIR`
/// points the suite at an external corpus instead.
pub fn conformance_dir() -> PathBuf {
    std::env::var("ESCALATION_PATHS_CONFORMANCE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/conformance")
        })
}

/// Read a suite file relative to [`conformance_dir`].
pub fn read_suite(relative: &str) -> String {
    let path = conformance_dir().join(relative);
    assert!(path.exists(), "Conformance fixture not found: {:?}", path);
    std::fs::read_to_string(&path).unwrap()
}
