//! Integrity rules for the genetic-method catalog.
//!
//! Every rule is a pure function over records the caller has already loaded.
//! Nothing here touches storage: the service gathers the facts a rule needs,
//! asks the rule, and only then mutates.
//!
//! - [`diagnostics`]: [`RuleViolation`], one variant per rule
//! - [`rules`]: the checks themselves

pub mod diagnostics;
pub mod rules;

pub use diagnostics::{RuleViolation, ViolationKind};
pub use rules::*;
