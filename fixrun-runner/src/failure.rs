// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure values raised by hooks and case bodies.
//!
//! Failure kinds form a hierarchy through `::`-separated segments, so an
//! expected-failure directive declared against an ancestor kind also matches
//! failures of more specialized kinds.

use smol_str::SmolStr;
use std::{any::Any, fmt};
use thiserror::Error;

/// A hierarchical failure kind identifier, e.g. `fault` or `fault::cast`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FailureKind(SmolStr);

impl FailureKind {
    /// The kind of assertion-style mismatches. Failures within this kind are
    /// classified as Failed rather than Errored.
    pub const ASSERT: FailureKind = FailureKind(SmolStr::new_static("assert"));

    /// The kind synthesized for panics caught from a hook or case body.
    pub const PANIC: FailureKind = FailureKind(SmolStr::new_static("panic"));

    /// Creates a new failure kind from a `::`-separated identifier.
    pub fn new(kind: impl AsRef<str>) -> Self {
        Self(SmolStr::new(kind.as_ref()))
    }

    /// Returns the kind as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this kind equals `ancestor` or is a specialization of
    /// it (extends it by one or more `::`-separated segments).
    pub fn is_within(&self, ancestor: &FailureKind) -> bool {
        match self.0.strip_prefix(ancestor.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with("::"),
            None => false,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for FailureKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// A failure raised by a hook or case body.
#[derive(Clone, Debug, Error)]
#[error("{kind}: {message}")]
pub struct Failure {
    /// The hierarchical kind of this failure.
    pub kind: FailureKind,

    /// Human-readable description.
    pub message: String,
}

impl Failure {
    /// Creates a new failure of the given kind.
    pub fn new(kind: impl Into<FailureKind>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates an assertion-style failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ASSERT, message)
    }

    /// Creates a failure from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_owned()
        };
        Self::new(FailureKind::PANIC, message)
    }

    /// Returns true if this failure classifies as an assertion mismatch.
    pub fn is_assertion(&self) -> bool {
        self.kind.is_within(&FailureKind::ASSERT)
    }
}

/// Returns an assertion failure if the two values are not equal.
///
/// The sample fixtures use this as a stand-in for real verification logic.
pub fn ensure_eq<T: fmt::Debug + PartialEq>(left: T, right: T) -> Result<(), Failure> {
    if left == right {
        Ok(())
    } else {
        Err(Failure::assertion(format!(
            "expected {left:?} to equal {right:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("fault", "fault", true; "equal kinds match")]
    #[test_case("fault::cast", "fault", true; "specialization matches ancestor")]
    #[test_case("fault::cast::narrow", "fault", true; "deep specialization matches")]
    #[test_case("fault", "fault::cast", false; "ancestor does not match specialization")]
    #[test_case("faultier", "fault", false; "segment prefix is not a hierarchy match")]
    #[test_case("assert", "fault", false; "unrelated kinds do not match")]
    fn kind_is_within(kind: &str, ancestor: &str, expected: bool) {
        assert_eq!(
            FailureKind::new(kind).is_within(&FailureKind::new(ancestor)),
            expected
        );
    }

    #[test]
    fn assertion_classification() {
        assert!(Failure::assertion("1 != 2").is_assertion());
        assert!(Failure::new(FailureKind::new("assert::eq"), "1 != 2").is_assertion());
        assert!(!Failure::new(FailureKind::new("fault"), "boom").is_assertion());
        assert!(!Failure::new(FailureKind::PANIC, "boom").is_assertion());
    }

    #[test]
    fn ensure_eq_messages() {
        assert!(ensure_eq(1 + 1, 2).is_ok());
        let failure = ensure_eq(1 + 1, 3).expect_err("mismatch");
        assert_eq!(failure.message, "expected 2 to equal 3");
        assert!(failure.is_assertion());
    }
}
