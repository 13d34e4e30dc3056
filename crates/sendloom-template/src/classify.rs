//! Partitioning of template variables into system and custom sets.

/// Reserved placeholder names resolved automatically from context at send
/// time. Fixed at compile time; not configurable at runtime.
pub const SYSTEM_VARIABLES: [&str; 3] = ["company_name", "subscriber_email", "subscriber_username"];

/// Returns true if `name` is a reserved system variable.
///
/// Names are matched exactly, with no case normalization: placeholder
/// identifiers are already constrained to a fixed character class.
#[must_use]
pub fn is_system_variable(name: &str) -> bool {
    SYSTEM_VARIABLES.contains(&name)
}

/// A variable set partitioned into system and custom subsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Names resolved automatically from context at send time.
    pub system: Vec<String>,
    /// Names requiring an operator-entered value per campaign.
    pub custom: Vec<String>,
}

/// Partitions a variable list into system and custom subsets.
///
/// Input ordering is preserved within each partition. Classification is a
/// pure function of the names and the reserved registry; it never fails.
#[must_use]
pub fn classify(variables: &[String]) -> Classification {
    let mut classification = Classification::default();
    for name in variables {
        if is_system_variable(name) {
            classification.system.push(name.clone());
        } else {
            classification.custom.push(name.clone());
        }
    }
    classification
}
