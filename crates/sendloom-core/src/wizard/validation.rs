//! Step-gate validation errors.

/// A field-scoped validation failure surfaced to the operator.
///
/// Errors are collected into a list that is replaced wholesale on every
/// validation pass, so the host can render all problems at once. Step gates
/// never panic and never return `Err`; this list is the whole error surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No template chosen yet.
    NoTemplateSelected,
    /// A custom variable with no (post-trim) value; carries the name.
    MissingConstant(String),
    /// Campaign name is blank.
    EmptyName,
    /// No scheduled send time entered.
    MissingSchedule,
    /// Scheduled send time is not in the future.
    ScheduleInPast,
    /// The persistence collaborator rejected the submission; carries its
    /// message.
    Submit(String),
}

impl ValidationError {
    /// The field this error is scoped to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::NoTemplateSelected => "template",
            Self::MissingConstant(name) => name,
            Self::EmptyName => "name",
            Self::MissingSchedule | Self::ScheduleInPast => "scheduled_for",
            Self::Submit(_) => "submit",
        }
    }

    /// Human-readable error message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NoTemplateSelected => "Select a template to continue".to_string(),
            Self::MissingConstant(name) => format!("{name} is required"),
            Self::EmptyName => "Campaign name is required".to_string(),
            Self::MissingSchedule => "Scheduled time is required".to_string(),
            Self::ScheduleInPast => "Scheduled time must be in the future".to_string(),
            Self::Submit(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}
