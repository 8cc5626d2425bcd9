use escalation_paths::error::{ErrorKind, ValidationError};
use escalation_paths::parse::parse;
use escalation_paths::validate::validate;
use serde_json::{Value, json};

const VALID: &str = r#"
id: iam-001
name: iam:CreatePolicyVersion
category: self-escalation
services:
  - iam
permissions:
  required:
    - permission: iam:CreatePolicyVersion
      resourceConstraints: Must have access to modify the attached policy
description: Create a new default version of an attached policy.
exploitationSteps:
  awscli:
    - step: 1
      command: aws iam create-policy-version --set-as-default
      description: Publish an administrative policy version.
recommendation: Restrict iam:CreatePolicyVersion.
discoveredBy:
  name: Spencer Gietzen
  organization: Rhino Security Labs
"#;

const REQUIRED_FIELDS: [&str; 9] = [
    "id",
    "name",
    "category",
    "services",
    "permissions",
    "description",
    "exploitationSteps",
    "recommendation",
    "discoveredBy",
];

fn base() -> Value {
    parse(VALID).expect("parse should succeed")
}

fn errors_of(doc: &Value) -> Vec<ValidationError> {
    validate(doc).errors
}

/// Helper: replace one top-level field of the base document, then validate.
fn with_field(name: &str, value: Value) -> Vec<ValidationError> {
    let mut doc = base();
    doc[name] = value;
    errors_of(&doc)
}

fn kinds(errors: &[ValidationError]) -> Vec<ErrorKind> {
    errors.iter().map(|e| e.kind).collect()
}

fn paths(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(|e| e.path.to_string()).collect()
}

// ─── Well-formed documents ──────────────────────────────────────────────────

#[test]
fn well_formed_document_passes() {
    let errors = errors_of(&base());
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[test]
fn validation_is_idempotent_and_read_only() {
    let doc = base();
    let snapshot = doc.clone();
    let first = validate(&doc);
    let second = validate(&doc);
    assert_eq!(first, second);
    assert_eq!(doc, snapshot);

    let mut broken = base();
    broken["id"] = json!("iam-01");
    broken["category"] = json!("privilege-escalation");
    assert_eq!(validate(&broken), validate(&broken));
}

#[test]
fn document_with_every_optional_field_passes() {
    let yaml = r#"
id: lambda-001
name: iam:PassRole + lambda:CreateFunction
category: service-passrole
services: [iam, lambda]
permissions:
  required:
    - permission: iam:PassRole
    - permission: lambda:CreateFunction
  additional:
    - permission: lambda:InvokeFunction
description: Pass a privileged role to a new function and invoke it.
prerequisites:
  admin:
    - A role with administrative permissions exists
  lateral:
    - A role trusting lambda.amazonaws.com exists
exploitationSteps:
  awscli:
    - step: 2
      command: aws lambda invoke --function-name escalate out.json
      description: Invoke the function.
    - step: 1
      command: aws lambda create-function --function-name escalate --role arn
      description: Create the function with the privileged role.
  pacu:
    - step: 1
      command: run lambda__backdoor_new_roles
      description: Automate the technique.
recommendation: Restrict iam:PassRole with resource constraints.
limitations: Requires a role that trusts Lambda.
discoveredBy:
  name: Spencer Gietzen
discoveryAttribution:
  firstDocumented:
    author: Spencer Gietzen
    organization: Rhino Security Labs
    date: 2018
    link: https://rhinosecuritylabs.com/aws/aws-privilege-escalation-methods-mitigation/
  derivativeOf:
    pathId: iam-001
    modification: Uses a service role instead of a policy version
references:
  - title: AWS Privilege Escalation Methods
    url: https://rhinosecuritylabs.com/aws/aws-privilege-escalation-methods-mitigation/
relatedPaths:
  - lambda-002
  - iam-001
detectionRules:
  - platform: CloudSIEM
    ruleId: lambda-passrole
detectionTools:
  pmapper: https://github.com/nccgroup/PMapper
learningEnvironments:
  iam-vulnerable:
    type: open-source
    description: Terraform lab with every path
    githubLink: https://github.com/BishopFox/iam-vulnerable
  cybr:
    type: closed-source
    description: Hosted lab
    scenarioPricingModel: paid
toolSupport:
  pmapper: true
  pacu: false
attackVisualization:
  nodes:
    - id: start
      label: Starting principal
      type: principal
    - id: fn
      label: Lambda function
      type: resource
      description: A new function running as the privileged role.
    - id: admin
      label: Administrator
      type: outcome
  edges:
    - from: start
      to: fn
      label: lambda:CreateFunction
    - from: fn
      to: admin
      label: lambda:InvokeFunction
"#;
    let result = validate(&parse(yaml).unwrap());
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
}

// ─── Requiredness ───────────────────────────────────────────────────────────

#[test]
fn each_missing_required_field_is_one_error() {
    for field in REQUIRED_FIELDS {
        let mut doc = base();
        doc.as_object_mut().unwrap().remove(field);
        let errors = errors_of(&doc);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::MissingField],
            "removing '{}' gave {:?}",
            field,
            errors
        );
        assert_eq!(errors[0].path.to_string(), field);
    }
}

#[test]
fn missing_permissions_mentions_legacy_name() {
    let mut doc = base();
    doc.as_object_mut().unwrap().remove("permissions");
    let errors = errors_of(&doc);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("requiredPermissions"));
}

#[test]
fn legacy_required_permissions_satisfies_requirement() {
    let mut doc = base();
    let map = doc.as_object_mut().unwrap();
    map.remove("permissions");
    map.insert(
        "requiredPermissions".to_string(),
        json!([{"permission": "iam:CreatePolicyVersion"}]),
    );
    assert!(errors_of(&doc).is_empty());
}

#[test]
fn legacy_required_permissions_entries_are_checked() {
    let mut doc = base();
    let map = doc.as_object_mut().unwrap();
    map.remove("permissions");
    map.insert(
        "requiredPermissions".to_string(),
        json!([{"permission": "CreatePolicyVersion"}]),
    );
    let errors = errors_of(&doc);
    assert_eq!(kinds(&errors), vec![ErrorKind::FormatViolation]);
    assert_eq!(paths(&errors), vec!["requiredPermissions[0].permission"]);
}

#[test]
fn current_and_legacy_permissions_together_fail() {
    let mut doc = base();
    doc["requiredPermissions"] = json!([{"permission": "iam:CreatePolicyVersion"}]);
    let errors = errors_of(&doc);
    assert_eq!(kinds(&errors), vec![ErrorKind::UnexpectedField]);
    assert_eq!(paths(&errors), vec!["requiredPermissions"]);
}

#[test]
fn current_permissions_are_checked_beside_legacy_form() {
    let mut doc = base();
    doc["permissions"] = json!({"required": []});
    doc["requiredPermissions"] = json!([{"permission": "iam:CreatePolicyVersion"}]);
    let errors = errors_of(&doc);
    assert_eq!(
        kinds(&errors),
        vec![ErrorKind::UnexpectedField, ErrorKind::FormatViolation]
    );
    assert_eq!(paths(&errors), vec!["requiredPermissions", "permissions.required"]);
}

#[test]
fn unexpected_fields_are_reported_once_each() {
    let mut doc = base();
    doc["severity"] = json!("high");
    doc["toolsupport"] = json!({});
    let errors = errors_of(&doc);
    assert_eq!(
        kinds(&errors),
        vec![ErrorKind::UnexpectedField, ErrorKind::UnexpectedField]
    );
    assert_eq!(paths(&errors), vec!["severity", "toolsupport"]);
    assert_eq!(errors[0].message, "unexpected field: severity");
}

#[test]
fn wrong_top_level_shape_is_type_mismatch() {
    let errors = with_field("services", json!("iam"));
    assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
    assert!(errors[0].message.contains("list"), "{}", errors[0].message);

    let errors = with_field("discoveredBy", json!("Spencer Gietzen"));
    assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
}

// ─── Identifier and category ────────────────────────────────────────────────

#[test]
fn malformed_ids_are_format_violations() {
    for id in ["iam-01", "iam001", "iam-0001", "i_am-001", "iam-x-001", ""] {
        let errors = with_field("id", json!(id));
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::FormatViolation],
            "id {:?} gave {:?}",
            id,
            errors
        );
        assert_eq!(paths(&errors), vec!["id"]);
    }
}

#[test]
fn id_failures_have_distinct_messages() {
    let message = |id: &str| with_field("id", json!(id)).remove(0).message;
    let messages = [
        message(""),
        message("iam-x-001"),
        message("i_am-001"),
        message("iam-01"),
    ];
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn unknown_category_lists_allowed_values() {
    let errors = with_field("category", json!("privilege-escalation"));
    assert_eq!(kinds(&errors), vec![ErrorKind::EnumViolation]);
    assert!(errors[0].message.contains("self-escalation"));
    assert!(errors[0].message.contains("access-resource"));
}

#[test]
fn empty_services_list_fails() {
    let errors = with_field("services", json!([]));
    assert_eq!(kinds(&errors), vec![ErrorKind::FormatViolation]);
}

// ─── Exploitation steps ─────────────────────────────────────────────────────

fn steps_yaml(numbers: &[i64]) -> String {
    let mut yaml = String::from("awscli:\n");
    for n in numbers {
        yaml.push_str(&format!(
            "  - step: {n}\n    command: aws step {n}\n    description: Step {n}.\n"
        ));
    }
    yaml
}

fn step_errors(numbers: &[i64]) -> Vec<ValidationError> {
    let steps = parse(&steps_yaml(numbers)).unwrap();
    with_field("exploitationSteps", steps)
}

#[test]
fn step_numbers_may_appear_in_any_order() {
    for numbers in [[1i64, 2, 3], [3, 1, 2], [2, 3, 1], [3, 2, 1]] {
        let errors = step_errors(&numbers);
        assert!(errors.is_empty(), "{:?} gave {:?}", numbers, errors);
    }
}

#[test]
fn duplicate_step_number_is_sequence_violation() {
    let errors = step_errors(&[1, 1, 3]);
    assert_eq!(kinds(&errors), vec![ErrorKind::SequenceViolation]);
    assert_eq!(paths(&errors), vec!["exploitationSteps.awscli"]);
    assert!(
        errors[0]
            .message
            .contains("Found: [1, 1, 3], Expected: [1, 2, 3]"),
        "{}",
        errors[0].message
    );
}

#[test]
fn steps_not_starting_at_one_fail() {
    let errors = step_errors(&[0, 1, 2]);
    assert_eq!(kinds(&errors), vec![ErrorKind::SequenceViolation]);
    let errors = step_errors(&[2, 3]);
    assert_eq!(kinds(&errors), vec![ErrorKind::SequenceViolation]);
}

#[test]
fn legacy_flat_step_list_is_accepted() {
    let errors = with_field(
        "exploitationSteps",
        json!([
            {"step": 1, "command": "aws iam list-policies", "description": "Find a policy."},
            {"step": 2, "command": "aws iam create-policy-version", "description": "Escalate."}
        ]),
    );
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn unknown_tool_and_empty_tool_list_fail() {
    let errors = with_field(
        "exploitationSteps",
        json!({"metasploit": [{"step": 1, "command": "x", "description": "y"}], "awscli": []}),
    );
    assert_eq!(
        kinds(&errors),
        vec![ErrorKind::EnumViolation, ErrorKind::FormatViolation]
    );
    assert!(errors[1].message.contains("tool 'awscli'"));
}

// ─── Attack visualization ───────────────────────────────────────────────────

fn graph(edge_to: &str, second_id: &str) -> Value {
    json!({
        "nodes": [
            {"id": "a", "label": "Attacker", "type": "principal"},
            {"id": second_id, "label": "Admin", "type": "outcome"}
        ],
        "edges": [{"from": "a", "to": edge_to, "label": "escalates"}]
    })
}

#[test]
fn graph_with_resolved_edges_passes() {
    assert!(with_field("attackVisualization", graph("b", "b")).is_empty());
}

#[test]
fn legacy_diagram_string_passes() {
    let errors = with_field(
        "attackVisualization",
        json!("graph LR\n  A[Attacker] --> B[Admin]"),
    );
    assert!(errors.is_empty());
}

#[test]
fn edge_to_unknown_node_is_referential_violation() {
    let errors = with_field("attackVisualization", graph("c", "b"));
    assert_eq!(
        kinds(&errors),
        vec![ErrorKind::ReferentialIntegrityViolation]
    );
    assert_eq!(paths(&errors), vec!["attackVisualization.edges[0].to"]);
    assert!(errors[0].message.contains("c"));
}

#[test]
fn duplicate_node_id_fails() {
    let errors = with_field("attackVisualization", graph("a", "a"));
    assert_eq!(kinds(&errors), vec![ErrorKind::DuplicateId]);
    assert_eq!(paths(&errors), vec!["attackVisualization.nodes[1].id"]);
}

#[test]
fn unknown_node_type_fails() {
    let mut g = graph("b", "b");
    g["nodes"][1]["type"] = json!("target");
    let errors = with_field("attackVisualization", g);
    assert_eq!(kinds(&errors), vec![ErrorKind::EnumViolation]);
}

#[test]
fn graph_missing_edges_is_missing_field() {
    let errors = with_field(
        "attackVisualization",
        json!({"nodes": [{"id": "a", "label": "A", "type": "principal"}]}),
    );
    assert_eq!(kinds(&errors), vec![ErrorKind::MissingField]);
    assert_eq!(paths(&errors), vec!["attackVisualization.edges"]);
}

#[test]
fn wrapped_node_description_fails() {
    let mut g = graph("b", "b");
    g["nodes"][0]["description"] = json!(
        "The attacker uses iam:PassRole to hand an administrative role to a new\n\
         lambda function, then invokes the function so that the code it runs executes\n\
         with the permissions of the passed role rather than the permissions of the\n\
         original principal, which completes the escalation."
    );
    let errors = with_field("attackVisualization", g);
    assert_eq!(kinds(&errors), vec![ErrorKind::FormatViolation]);
    assert_eq!(
        paths(&errors),
        vec!["attackVisualization.nodes[0].description"]
    );
}

#[test]
fn single_line_description_passes() {
    let mut g = graph("b", "b");
    g["edges"][0]["description"] = json!(
        "The attacker uses iam:PassRole to hand an administrative role to a new lambda function."
    );
    assert!(with_field("attackVisualization", g).is_empty());
}

// ─── Discovery attribution ──────────────────────────────────────────────────

#[test]
fn attribution_object_and_list_forms_pass() {
    let object = json!({"firstDocumented": {"author": "Spencer Gietzen", "date": "2018-06-01"}});
    assert!(with_field("discoveryAttribution", object).is_empty());

    let list = json!([{"item": "First documented by Rhino Security Labs", "link": "https://example.com"}]);
    assert!(with_field("discoveryAttribution", list).is_empty());
}

#[test]
fn attribution_object_needs_first_documented() {
    let errors = with_field(
        "discoveryAttribution",
        json!({"derivativeOf": {"pathId": "iam-001"}}),
    );
    assert_eq!(kinds(&errors), vec![ErrorKind::MissingField]);
    assert_eq!(
        paths(&errors),
        vec!["discoveryAttribution.firstDocumented"]
    );
}

#[test]
fn attribution_list_items_need_item() {
    let errors = with_field(
        "discoveryAttribution",
        json!([{"link": "https://example.com"}]),
    );
    assert_eq!(kinds(&errors), vec![ErrorKind::MissingField]);
    assert_eq!(paths(&errors), vec!["discoveryAttribution[0].item"]);
}

#[test]
fn attribution_scalar_is_type_mismatch() {
    let errors = with_field("discoveryAttribution", json!("Rhino Security Labs"));
    assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
}

// ─── Errors are collected, not short-circuited ──────────────────────────────

#[test]
fn independent_defects_are_all_reported() {
    let mut doc = base();
    doc["id"] = json!("iam-1");
    doc["category"] = json!("other");
    doc["permissions"] = json!({"required": [{"permission": "PassRole"}]});
    doc["relatedPaths"] = json!(["iam_002"]);
    let errors = errors_of(&doc);
    assert_eq!(
        kinds(&errors),
        vec![
            ErrorKind::FormatViolation,
            ErrorKind::EnumViolation,
            ErrorKind::FormatViolation,
            ErrorKind::FormatViolation,
        ]
    );
    assert!(errors[3].message.starts_with("invalid related path ID 'iam_002'"));
}

// ─── Scalar decoding ────────────────────────────────────────────────────────

#[test]
fn yes_no_spellings_are_plain_strings() {
    let source = VALID.replace("name: iam:CreatePolicyVersion", "name: n")
        + "attackVisualization:\n  nodes:\n    - id: y\n      label: on\n      type: principal\n    - id: n\n      label: No\n      type: outcome\n  edges:\n    - from: y\n      to: n\n      label: off\n";
    let doc = parse(&source).expect("parse should succeed");
    assert_eq!(doc["name"], json!("n"));
    assert_eq!(doc["attackVisualization"]["nodes"][0]["id"], json!("y"));

    let result = escalation_paths::check(&source);
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
}
