//! Schema validator for IAM privilege-escalation path documents.
//!
//! A path document is a YAML (or JSON) mapping describing one escalation
//! technique. The schema has evolved, so several fields accept both a current
//! and a legacy shape; this crate accepts both and checks each on its own
//! terms:
//!
//! ```text
//! parse(yaml) → Value → Validator::validate(&value) → ValidationResult
//! discover(target) → Discovery → batch::run → BatchReport
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! let yaml = r#"
//! id: iam-001
//! name: iam:CreatePolicyVersion
//! category: self-escalation
//! services: [iam]
//! permissions:
//!   required:
//!     - permission: iam:CreatePolicyVersion
//! description: Create a new default version of an attached policy.
//! exploitationSteps:
//!   awscli:
//!     - step: 1
//!       command: aws iam create-policy-version --set-as-default
//!       description: Publish an administrative policy version.
//! recommendation: Restrict iam:CreatePolicyVersion.
//! discoveredBy:
//!   name: Spencer Gietzen
//! "#;
//!
//! let result = escalation_paths::check(yaml);
//! assert!(result.is_valid(), "{:?}", result.errors);
//! ```

pub mod batch;
pub mod composite;
pub mod config;
pub mod enums;
pub mod error;
pub mod export;
pub mod fields;
pub mod graph;
pub mod parse;
pub mod primitives;
pub mod shape;
pub mod text;
pub mod validate;

pub use error::*;

// Re-export entry-point functions at the crate root for convenience.
pub use batch::{BatchReport, Discovery, DocumentReport, discover, validate_target};
pub use config::ValidatorConfig;
pub use parse::parse;
pub use validate::{Validator, validate};

/// Convenience entry point composing parse → validate with default settings.
///
/// Parse failures are reported as a single `ParseFailure` error in the
/// result rather than as an `Err`, so every outcome is one verdict.
pub fn check(input: &str) -> ValidationResult {
    Validator::default().validate_source(input, parse::SourceFormat::Yaml)
}
