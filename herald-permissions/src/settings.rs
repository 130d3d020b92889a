//! Requirement settings for a command

use crate::requirement::Requirement;

/// A command's authorization policy: requirements plus a default decision.
///
/// Declaration order matters only as the tie-break between requirements of
/// equal priority.
///
/// # Examples
///
/// ```
/// use herald_permissions::{Requirement, RequirementSettings};
///
/// let settings = RequirementSettings::deny_by_default()
///     .with_requirement(Requirement::role("Moderator"))
///     .with_requirement(Requirement::permission("administrator"));
///
/// assert!(!settings.default_allow);
/// assert_eq!(settings.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequirementSettings {
    /// Requirements in declaration order
    pub requirements: Vec<Requirement>,

    /// Decision when no requirement overrides it
    pub default_allow: bool,
}

impl RequirementSettings {
    /// Create empty settings with the given default decision.
    pub fn new(default_allow: bool) -> Self {
        Self {
            requirements: Vec::new(),
            default_allow,
        }
    }

    /// Empty settings that allow unless a requirement revokes.
    pub fn allow_by_default() -> Self {
        Self::new(true)
    }

    /// Empty settings that deny unless a requirement grants.
    pub fn deny_by_default() -> Self {
        Self::new(false)
    }

    /// Append a requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Append several requirements, keeping their order.
    pub fn with_requirements<I>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = Requirement>,
    {
        self.requirements.extend(requirements);
        self
    }

    /// Append a requirement in place.
    pub fn push(&mut self, requirement: Requirement) {
        self.requirements.push(requirement);
    }

    /// Number of requirements.
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Check if there are no requirements.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}
