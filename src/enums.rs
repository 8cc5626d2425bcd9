//! Closed value sets used throughout the path schema.
//!
//! Each set is a compile-time table; only the listed values are valid.
//! Validators look values up here rather than repeating literals.

/// A named closed set of allowed string values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumTable {
    /// Noun used in violation messages, e.g. "category".
    pub name: &'static str,
    pub values: &'static [&'static str],
}

impl EnumTable {
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(&value)
    }

    /// Comma-separated list of allowed values.
    pub fn allowed(&self) -> String {
        self.values.join(", ")
    }
}

/// Escalation path categories.
pub static CATEGORIES: EnumTable = EnumTable {
    name: "category",
    values: &[
        "self-escalation",
        "lateral-movement",
        "service-passrole",
        "credential-access",
        "access-resource",
    ],
};

/// `type` of a legacy list-form prerequisite object.
pub static PREREQUISITE_TYPES: EnumTable = EnumTable {
    name: "prerequisite type",
    values: &["resource-state", "trust-relationship", "service-config"],
};

/// Tabs of the mapping-form prerequisites.
pub static PREREQUISITE_TABS: EnumTable = EnumTable {
    name: "prerequisites tab",
    values: &["admin", "lateral"],
};

/// Tool keys of the mapping-form exploitation steps.
pub static EXPLOITATION_TOOLS: EnumTable = EnumTable {
    name: "tool",
    values: &[
        "awscli",
        "pacu",
        "pmapper",
        "stratus",
        "leonidas",
        "nebula",
        "pathfinder",
    ],
};

/// Attack graph node types. `action` is deprecated in favour of `payload`
/// but still accepted.
pub static NODE_TYPES: EnumTable = EnumTable {
    name: "node type",
    values: &["principal", "resource", "payload", "action", "outcome"],
};

/// Learning environment types.
pub static ENVIRONMENT_TYPES: EnumTable = EnumTable {
    name: "learning environment type",
    values: &["open-source", "closed-source"],
};

/// Pricing models of closed-source learning environments.
pub static PRICING_MODELS: EnumTable = EnumTable {
    name: "scenarioPricingModel",
    values: &["paid", "free"],
};

/// Keys of the deprecated `toolSupport` map.
pub static LEGACY_SUPPORT_TOOLS: EnumTable = EnumTable {
    name: "toolSupport tool",
    values: &["pmapper", "iamVulnerable", "pacu", "prowler"],
};
