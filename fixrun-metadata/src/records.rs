// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types produced for external reporters.

use crate::FilterMatch;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The terminal outcome of one invocation, in serializable form.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "result")]
pub enum OutcomeRecord {
    /// The case body completed without raising a failure.
    Passed,

    /// The case body raised an assertion-style failure.
    Failed {
        /// Human-readable description of the mismatch.
        message: String,
    },

    /// A non-assertion failure was raised, by the case body or by a hook.
    Errored {
        /// The hierarchical failure kind, e.g. `fault::cast`.
        kind: String,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The case carries a skip directive and was not executed.
    Skipped {
        /// The declared skip reason.
        reason: String,
    },

    /// The case declared an expected failure and a matching failure was
    /// raised. Treated as success.
    ExpectedFailureObserved {
        /// The kind of the raised failure.
        kind: String,
    },

    /// The case declared an expected failure but the body completed without
    /// raising. Treated as failure.
    ExpectedFailureNotObserved,

    /// Reserved for runners that add deadlines; the sequential runner never
    /// produces this.
    TimedOut,
}

impl OutcomeRecord {
    /// Returns true if this outcome counts as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OutcomeRecord::Passed | OutcomeRecord::ExpectedFailureObserved { .. }
        )
    }
}

/// One record per invocation, emitted by the structured reporter.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InvocationRecord {
    /// The fixture name.
    pub fixture: String,

    /// The case name.
    pub case: String,

    /// Displayed parameter values, in source order. Empty for
    /// unparameterized cases.
    pub params: Vec<String>,

    /// Zero-based repeat iteration.
    pub repeat_index: usize,

    /// The declared repeat count.
    pub repeat_total: usize,

    /// The terminal outcome.
    pub outcome: OutcomeRecord,

    /// Failure raised by a teardown hook after the primary outcome was
    /// decided. Never overwrites the outcome.
    pub teardown_error: Option<String>,

    /// Diagnostic text captured from hooks and the case body.
    pub output: String,

    /// The time at which the invocation started.
    pub start_time: DateTime<FixedOffset>,

    /// Wall-clock time taken by the invocation, including its hooks.
    #[serde(with = "humantime_serde")]
    pub time_taken: Duration,
}

/// Summary of a run list, produced by the `list` operation.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunListSummary {
    /// Number of registered fixtures.
    pub fixture_count: usize,

    /// Number of cases selected by the filter.
    pub selected_case_count: usize,

    /// Number of cases excluded by the filter.
    pub excluded_case_count: usize,

    /// Number of concrete invocations the selected cases expand into.
    pub invocation_count: usize,

    /// Per-fixture detail, in declaration order.
    pub fixtures: Vec<FixtureListRecord>,
}

/// Listing detail for one fixture.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FixtureListRecord {
    /// The fixture name.
    pub name: String,

    /// Category tags declared on the fixture.
    pub tags: Vec<String>,

    /// Cases in declaration order.
    pub cases: Vec<CaseListRecord>,
}

/// Listing detail for one case.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CaseListRecord {
    /// The case name.
    pub name: String,

    /// Category tags declared on the case.
    pub tags: Vec<String>,

    /// Whether the case matched the filter.
    pub filter_match: FilterMatch,

    /// Number of invocations this case expands into (parameter tuples times
    /// repeat count). Zero for excluded cases.
    pub invocation_count: usize,

    /// The declared skip reason, if any.
    pub skip_reason: Option<String>,

    /// True if the case is excluded from default runs.
    pub explicit_only: bool,
}

/// Final statistics for a run, in serializable form.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunStatsSummary {
    /// The number of invocations expected at the start of the run.
    pub initial_invocation_count: usize,

    /// The number of invocations that produced an outcome.
    pub finished_count: usize,

    /// Invocations that passed.
    pub passed: usize,

    /// Invocations that failed an assertion.
    pub failed: usize,

    /// Invocations that errored, including fixture-setup short-circuits.
    pub errored: usize,

    /// Invocations skipped by directive.
    pub skipped: usize,

    /// Invocations whose declared expected failure was observed.
    pub expected_failures_observed: usize,

    /// Invocations whose declared expected failure was not observed.
    pub expected_failures_not_observed: usize,

    /// Fixture-level hook failures (setup and teardown), counted per hook.
    pub fixture_hook_errors: usize,
}

/// One line of structured (JSON-lines) reporter output.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum StructuredMessage {
    /// An invocation finished.
    Invocation {
        /// The invocation record.
        #[serde(flatten)]
        record: InvocationRecord,
    },

    /// The run finished. Always the last line of a completed run.
    RunFinished {
        /// Final statistics.
        stats: RunStatsSummary,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_record_serde_shape() {
        let json = serde_json::to_string(&OutcomeRecord::Errored {
            kind: "fault::cast".to_owned(),
            message: "bad cast".to_owned(),
        })
        .expect("serialization succeeded");
        assert_eq!(
            json,
            r#"{"result":"errored","kind":"fault::cast","message":"bad cast"}"#
        );
    }

    #[test]
    fn outcome_record_success() {
        assert!(OutcomeRecord::Passed.is_success());
        assert!(
            OutcomeRecord::ExpectedFailureObserved {
                kind: "fault".to_owned()
            }
            .is_success()
        );
        assert!(!OutcomeRecord::ExpectedFailureNotObserved.is_success());
        assert!(
            !OutcomeRecord::Skipped {
                reason: "x".to_owned()
            }
            .is_success()
        );
    }
}
