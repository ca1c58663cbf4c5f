// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fmt, time::Duration};

/// Utilities for pluralizing various words based on count.
pub(crate) mod plural {
    pub(crate) fn invocations_str(count: usize) -> &'static str {
        if count == 1 { "invocation" } else { "invocations" }
    }

    pub(crate) fn fixtures_str(count: usize) -> &'static str {
        if count == 1 { "fixture" } else { "fixtures" }
    }

    pub(crate) fn cases_str(count: usize) -> &'static str {
        if count == 1 { "case" } else { "cases" }
    }
}

pub(crate) struct DisplayBracketedDuration(pub(crate) Duration);

impl fmt::Display for DisplayBracketedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // * > means right-align.
        // * 8 is the number of characters to pad to.
        // * .3 means print three digits after the decimal point.
        write!(f, "[{:>8.3?}s] ", self.0.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_duration_is_padded() {
        let s = DisplayBracketedDuration(Duration::from_millis(1500)).to_string();
        assert_eq!(s, "[   1.500s] ");
    }

    #[test]
    fn plural_helpers() {
        assert_eq!(plural::invocations_str(1), "invocation");
        assert_eq!(plural::invocations_str(2), "invocations");
        assert_eq!(plural::fixtures_str(0), "fixtures");
        assert_eq!(plural::cases_str(1), "case");
    }
}
