//! Wizard step ordering.

/// The four steps of the campaign creation wizard, in required order.
///
/// The ordering is a static transition table: [`next`](Self::next) and
/// [`previous`](Self::previous) are the only moves, so a jump such as
/// `Review` to `ConstantsFill` cannot be expressed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    /// Pick the template the campaign will render.
    #[default]
    TemplateSelect,
    /// Bind a value to every custom variable.
    ConstantsFill,
    /// Name the campaign and schedule delivery.
    Metadata,
    /// Preview and submit.
    Review,
}

impl WizardStep {
    /// All steps in wizard order.
    pub const ALL: [Self; 4] = [
        Self::TemplateSelect,
        Self::ConstantsFill,
        Self::Metadata,
        Self::Review,
    ];

    /// The step after this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::TemplateSelect => Some(Self::ConstantsFill),
            Self::ConstantsFill => Some(Self::Metadata),
            Self::Metadata => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// The step before this one, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::TemplateSelect => None,
            Self::ConstantsFill => Some(Self::TemplateSelect),
            Self::Metadata => Some(Self::ConstantsFill),
            Self::Review => Some(Self::Metadata),
        }
    }

    /// 1-based position, for "Step N of 4" displays.
    #[must_use]
    pub const fn position(self) -> usize {
        match self {
            Self::TemplateSelect => 1,
            Self::ConstantsFill => 2,
            Self::Metadata => 3,
            Self::Review => 4,
        }
    }

    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TemplateSelect => "template",
            Self::ConstantsFill => "constants",
            Self::Metadata => "metadata",
            Self::Review => "review",
        }
    }

    /// Human-readable step title.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::TemplateSelect => "Select Template",
            Self::ConstantsFill => "Fill Constants",
            Self::Metadata => "Campaign Details",
            Self::Review => "Review & Submit",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
