//! # mc-core
//!
//! Core types for the MISRA-C style checker.
//!
//! Every rule in the checker reports through the same [`Violation`] type,
//! and every checked file produces one [`CheckReport`]. The report owns the
//! ordering contract: violations are sorted by line, stably, so line rules
//! come before AST rules on the same line.
//!
//! ## Categories
//!
//! | Category | Meaning |
//! |----------|---------|
//! | Mandatory | Never deviated from |
//! | Required | Deviation needs a formal record |
//! | Advisory | Recommended practice |

pub mod config;
pub mod error;
pub mod report;
pub mod violation;

pub use config::CheckerConfig;
pub use error::{CheckError, ConfigError};
pub use report::{CheckReport, Palette};
pub use violation::{Category, RuleMeta, Violation};
