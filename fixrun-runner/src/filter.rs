// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filters that determine the active subset of cases for a run.

use crate::{
    errors::{RunExplicitParseError, TestFilterBuildError},
    fixture::{Fixture, TestCase},
};
use aho_corasick::AhoCorasick;
use fixrun_metadata::{FilterMatch, MismatchReason};
use smol_str::SmolStr;
use std::{collections::BTreeSet, fmt, str::FromStr};

/// How explicit-only cases take part in a run.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RunExplicit {
    /// Explicit-only cases run only when a concrete name pattern matches
    /// them.
    ///
    /// This is the default.
    #[default]
    Default,

    /// Run explicit-only cases alongside ordinary ones.
    All,

    /// Only run explicit-only cases.
    ExplicitOnly,
}

impl RunExplicit {
    /// The accepted string values.
    pub fn variants() -> [&'static str; 3] {
        ["default", "all", "explicit-only"]
    }
}

impl fmt::Display for RunExplicit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunExplicit::Default => write!(f, "default"),
            RunExplicit::All => write!(f, "all"),
            RunExplicit::ExplicitOnly => write!(f, "explicit-only"),
        }
    }
}

impl FromStr for RunExplicit {
    type Err = RunExplicitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(RunExplicit::Default),
            "all" => Ok(RunExplicit::All),
            "explicit-only" => Ok(RunExplicit::ExplicitOnly),
            other => Err(RunExplicitParseError::new(other)),
        }
    }
}

/// Builder for [`TestFilter`].
#[derive(Clone, Debug, Default)]
pub struct TestFilterBuilder {
    tags: BTreeSet<SmolStr>,
    patterns: Vec<String>,
    run_explicit: RunExplicit,
}

impl TestFilterBuilder {
    /// Requires cases (or their fixtures) to carry one of the given tags.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(SmolStr::new(tag.as_ref()));
        self
    }

    /// Adds a name-substring pattern, matched against `fixture::case` paths.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Sets how explicit-only cases take part in the run.
    pub fn with_run_explicit(mut self, run_explicit: RunExplicit) -> Self {
        self.run_explicit = run_explicit;
        self
    }

    /// Builds the filter.
    pub fn build(self) -> Result<TestFilter, TestFilterBuildError> {
        let name_match = if self.patterns.is_empty() {
            NameMatch::MatchAll
        } else {
            NameMatch::MatchSet(Box::new(AhoCorasick::new(&self.patterns)?))
        };
        Ok(TestFilter {
            tags: self.tags,
            name_match,
            run_explicit: self.run_explicit,
        })
    }
}

/// A filter over the registered cases.
#[derive(Debug)]
pub struct TestFilter {
    tags: BTreeSet<SmolStr>,
    name_match: NameMatch,
    run_explicit: RunExplicit,
}

#[derive(Debug)]
enum NameMatch {
    MatchAll,
    MatchSet(Box<AhoCorasick>),
}

impl Default for TestFilter {
    fn default() -> Self {
        Self {
            tags: BTreeSet::new(),
            name_match: NameMatch::MatchAll,
            run_explicit: RunExplicit::default(),
        }
    }
}

impl TestFilter {
    /// Creates a filter that selects every non-explicit case.
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns an enum describing whether the given case matches this filter.
    pub fn filter_match(&self, fixture: &Fixture, case: &TestCase) -> FilterMatch {
        if !self.tags.is_empty() {
            let tagged = self
                .tags
                .iter()
                .any(|tag| case.has_tag(tag) || fixture.has_tag(tag));
            if !tagged {
                return FilterMatch::Mismatch {
                    reason: MismatchReason::Tag,
                };
            }
        }

        let path = format!("{}::{}", fixture.name(), case.name());
        let name_matched = match &self.name_match {
            NameMatch::MatchAll => true,
            NameMatch::MatchSet(set) => set.is_match(path.as_str()),
        };
        if !name_matched {
            return FilterMatch::Mismatch {
                reason: MismatchReason::String,
            };
        }

        match self.run_explicit {
            RunExplicit::Default => {
                // Naming a pattern that reaches the case counts as deliberate
                // selection; a match-all filter does not.
                if case.is_explicit_only() && matches!(self.name_match, NameMatch::MatchAll) {
                    return FilterMatch::Mismatch {
                        reason: MismatchReason::Explicit,
                    };
                }
            }
            RunExplicit::All => {}
            RunExplicit::ExplicitOnly => {
                if !case.is_explicit_only() {
                    return FilterMatch::Mismatch {
                        reason: MismatchReason::Explicit,
                    };
                }
            }
        }

        FilterMatch::Matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use proptest::{collection::vec, prelude::*};

    fn case(name: &str) -> TestCase {
        TestCase::new(name, |_cx| Ok(()))
    }

    fn fixture() -> Fixture {
        Fixture::new("sample").with_tag("smoke")
    }

    #[test]
    fn tag_filter_considers_fixture_and_case() {
        let filter = TestFilterBuilder::default()
            .with_tag("slow")
            .build()
            .expect("filter built");
        let fixture = fixture();

        assert!(!filter.filter_match(&fixture, &case("plain")).is_match());
        assert!(
            filter
                .filter_match(&fixture, &case("tagged").with_tag("slow"))
                .is_match()
        );

        let fixture_tag_filter = TestFilterBuilder::default()
            .with_tag("smoke")
            .build()
            .expect("filter built");
        assert!(
            fixture_tag_filter
                .filter_match(&fixture, &case("plain"))
                .is_match()
        );
    }

    #[test]
    fn explicit_only_needs_deliberate_selection() {
        let fixture = fixture();
        let explicit_case = case("manual_check").explicit_only();

        let default_filter = TestFilter::any();
        assert_eq!(
            default_filter.filter_match(&fixture, &explicit_case),
            FilterMatch::Mismatch {
                reason: MismatchReason::Explicit
            }
        );

        let named = TestFilterBuilder::default()
            .with_pattern("manual_check")
            .build()
            .expect("filter built");
        assert!(named.filter_match(&fixture, &explicit_case).is_match());

        let all = TestFilterBuilder::default()
            .with_run_explicit(RunExplicit::All)
            .build()
            .expect("filter built");
        assert!(all.filter_match(&fixture, &explicit_case).is_match());

        let explicit_only = TestFilterBuilder::default()
            .with_run_explicit(RunExplicit::ExplicitOnly)
            .build()
            .expect("filter built");
        assert!(
            explicit_only
                .filter_match(&fixture, &explicit_case)
                .is_match()
        );
        assert!(!explicit_only.filter_match(&fixture, &case("plain")).is_match());
    }

    #[test]
    fn run_explicit_variants_parse() {
        for &variant in &RunExplicit::variants() {
            variant.parse::<RunExplicit>().expect("variant is valid");
        }
        assert!("sometimes".parse::<RunExplicit>().is_err());
    }

    proptest! {
        // An empty pattern list matches every non-explicit case name.
        #[test]
        fn proptest_empty_patterns(case_names in vec("[a-z_]{1,16}", 0..8)) {
            let filter = TestFilter::any();
            let fixture = fixture();
            for name in case_names {
                prop_assert!(filter.filter_match(&fixture, &case(&name)).is_match());
            }
        }

        // Exact case names always match as substrings of the path.
        #[test]
        fn proptest_exact_names(case_names in vec("[a-z_]{1,16}", 1..8)) {
            let mut builder = TestFilterBuilder::default();
            for name in &case_names {
                builder = builder.with_pattern(name.clone());
            }
            let filter = builder.build().expect("filter built");
            let fixture = fixture();
            for name in case_names {
                prop_assert!(filter.filter_match(&fixture, &case(&name)).is_match());
            }
        }
    }
}
