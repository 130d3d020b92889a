//! # Herald Permissions
//!
//! Prioritized permission requirements for Herald commands.
//!
//! ## Overview
//!
//! A command may carry [`RequirementSettings`]: a default decision plus an
//! ordered list of [`Requirement`]s. Each requirement is a test against the
//! invocation (user, role, guild, channel, platform permission or a custom
//! predicate) with an [`Effect`] for success and one for failure.
//!
//! ## Resolution
//!
//! ```text
//! status = default_allow ? HasPermission : NoPermission
//! for requirement in ascending priority (implicit first, ties by declaration):
//!     status = (test(requirement) ? on_success : on_failure).apply(status)
//! ```
//!
//! The last applied effect wins, so the highest-priority requirement has the
//! final say.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use herald_context::{InvocationContext, MemoryLookup};
//! use herald_permissions::{Effect, PermissionResolver, Requirement, RequirementSettings};
//!
//! async fn example() {
//!     let lookup = MemoryLookup::new();
//!     let settings = RequirementSettings::deny_by_default()
//!         .with_requirement(Requirement::role("Moderator"))
//!         .with_requirement(Requirement::user("banned-user").on_success(Effect::Revoke).with_priority(10));
//!
//!     let result = PermissionResolver::new(&lookup)
//!         .resolve(Some(&settings), &InvocationContext::none())
//!         .await
//!         .unwrap();
//!     assert!(!result.is_allowed());
//! }
//! ```

pub mod error;
pub mod evaluator;
pub mod requirement;
pub mod resolver;
pub mod result;
pub mod settings;
pub mod sorter;

pub use error::{CheckError, EvaluationError, EvaluationResult, PermissionError, ResolveResult};
pub use evaluator::RequirementEvaluator;
pub use requirement::{
    CheckFuture, CustomCheck, CustomPredicate, Effect, FnCheck, Requirement, RequirementKind, DEFAULT_PRIORITY,
};
pub use resolver::{FaultPolicy, PermissionResolver};
pub use result::{PermissionResult, PermissionStatus, RequirementFault};
pub use settings::RequirementSettings;
pub use sorter::evaluation_order;
