// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Serializable types shared between the fixrun runner and external drivers
//! and reporters.
//!
//! This crate contains no execution logic. It defines the stable shapes that
//! cross the process boundary: filter-match results produced during
//! selection, per-invocation outcome records, run summaries, and documented
//! process exit codes.

mod exit_codes;
mod records;

pub use exit_codes::*;
pub use records::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// An enum describing whether a test case matches a filter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum FilterMatch {
    /// This case matches the filter and will be run.
    Matches,

    /// This case does not match the filter.
    ///
    /// The `MismatchReason` inside describes why.
    Mismatch {
        /// The reason the filter isn't matched.
        reason: MismatchReason,
    },
}

impl FilterMatch {
    /// Returns true if the case matches the filter.
    pub fn is_match(&self) -> bool {
        matches!(self, FilterMatch::Matches)
    }
}

/// The reason a test case doesn't match a filter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchReason {
    /// Neither the case nor its fixture carries a requested tag.
    Tag,

    /// The case does not match the provided name patterns.
    String,

    /// The case is explicit-only and was not deliberately selected.
    Explicit,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::Tag => write!(f, "does not carry a requested tag"),
            MismatchReason::String => write!(f, "does not match the provided name patterns"),
            MismatchReason::Explicit => write!(f, "is explicit-only and was not selected by name"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_match_serde_shape() {
        let json = serde_json::to_string(&FilterMatch::Mismatch {
            reason: MismatchReason::Explicit,
        })
        .expect("serialization succeeded");
        assert_eq!(json, r#"{"status":"mismatch","reason":"explicit"}"#);

        let roundtrip: FilterMatch = serde_json::from_str(&json).expect("valid JSON");
        assert!(!roundtrip.is_match());
    }
}
