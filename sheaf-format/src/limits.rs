//! Structural limits for schema trees

use crate::error::{Result, SheafError};

/// Limits guarding against pathological schema descriptors
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum tree depth below the root (default: 32, hard: 256)
    pub max_depth: usize,
    /// Maximum number of nodes in a tree, groups included (default: 65,535, hard: 1,048,576)
    pub max_fields: usize,
    /// Maximum length of a flattened path in bytes (default: 4,096, hard: 65,536)
    pub max_path_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_fields: 65_535,
            max_path_length: 4_096,
        }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    pub fn hard_maximums() -> Self {
        Self {
            max_depth: 256,
            max_fields: 1_048_576,
            max_path_length: 65_536,
        }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();

        if self.max_depth == 0 || self.max_depth > hard.max_depth {
            return Err(SheafError::LimitExceeded(format!(
                "max_depth {} must be within 1..={}",
                self.max_depth, hard.max_depth
            )));
        }

        if self.max_fields > hard.max_fields {
            return Err(SheafError::LimitExceeded(format!(
                "max_fields {} exceeds hard limit {}",
                self.max_fields, hard.max_fields
            )));
        }

        if self.max_path_length > hard.max_path_length {
            return Err(SheafError::LimitExceeded(format!(
                "max_path_length {} exceeds hard limit {}",
                self.max_path_length, hard.max_path_length
            )));
        }

        Ok(())
    }
}
