//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the init document carries sector information
//! - Detect overlapping host:port declarations across sectors
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function over the parsed configuration
//! - Overlap checks run during registry build, once every vhost's port
//!   has been defaulted

use thiserror::Error;

use crate::config::schema::InitConfig;

/// A single semantic validation failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no sector information set")]
    NoSectors,

    #[error("vhost \"{key}\" is declared by both sector \"{first}\" and sector \"{second}\"")]
    DuplicateHostKey {
        key: String,
        first: String,
        second: String,
    },
}

/// Validate the init document after parsing.
pub fn validate_init(init: &InitConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if init.sector_paths.is_empty() {
        errors.push(ValidationError::NoSectors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reject overlapping `host:port` declarations.
///
/// Host matching is first-match-in-registry-order, so two live bindings
/// for the same key would make the winner an accident of declaration
/// order. Takes `(sector name, host key)` pairs in registry order and
/// reports every conflict.
pub fn check_vhost_overlap<'a, I>(bindings: I) -> Vec<ValidationError>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut errors = Vec::new();
    for (sector, key) in bindings {
        if let Some((first, _)) = seen.iter().find(|(_, k)| *k == key) {
            errors.push(ValidationError::DuplicateHostKey {
                key,
                first: first.clone(),
                second: sector.to_string(),
            });
        } else {
            seen.push((sector.to_string(), key));
        }
    }
    errors
}
