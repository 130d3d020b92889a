//! Priority ordering of requirements
//!
//! Requirements are evaluated in ascending priority so that the
//! highest-priority rule is applied last and its effect wins. Requirements
//! without an explicit priority come before every explicitly prioritized one.
//! The sort is stable: among equal priorities, declaration order is kept and
//! the later-declared requirement wins.

use crate::requirement::Requirement;

/// Order requirements for evaluation.
///
/// # Example
///
/// ```
/// use herald_permissions::{evaluation_order, Requirement};
///
/// let requirements = vec![
///     Requirement::user("high").with_priority(5),
///     Requirement::user("implicit"),
///     Requirement::user("low").with_priority(1),
/// ];
///
/// let order: Vec<&str> = evaluation_order(&requirements).iter().map(|r| r.identifier()).collect();
/// assert_eq!(order, vec!["implicit", "low", "high"]);
/// ```
pub fn evaluation_order(requirements: &[Requirement]) -> Vec<&Requirement> {
    let mut ordered: Vec<&Requirement> = requirements.iter().collect();
    // Option<i32> orders None before Some(_); sort_by_key is stable.
    ordered.sort_by_key(|requirement| requirement.priority);
    ordered
}
