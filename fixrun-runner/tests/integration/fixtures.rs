// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for running the demonstration fixtures.

use fixrun_runner::{
    filter::TestFilter,
    list::RunList,
    reporter::events::TestEventKind,
    runner::{ExecuteReport, Outcome, RunStats, TestRunner},
};

/// One finished invocation: its display name plus the full report.
pub(crate) struct FinishedInvocation {
    pub(crate) name: String,
    pub(crate) report: ExecuteReport,
}

/// Runs the demonstration fixtures under the given filter and collects every
/// finished invocation in execution order.
pub(crate) fn execute_with_filter(filter: &TestFilter) -> (Vec<FinishedInvocation>, RunStats) {
    let registry = sample_fixtures::registry().expect("sample registry is valid");
    let run_list = RunList::new(&registry, filter);
    let runner = TestRunner::new(&run_list);

    let mut finished = Vec::new();
    let stats = runner.execute(|event| {
        if let TestEventKind::CaseFinished { instance, report } = event.kind {
            finished.push(FinishedInvocation {
                name: instance.to_string(),
                report,
            });
        }
    });
    (finished, stats)
}

/// Returns the invocations of one case, identified by its `fixture::case`
/// prefix.
pub(crate) fn invocations_of<'a>(
    finished: &'a [FinishedInvocation],
    prefix: &str,
) -> Vec<&'a FinishedInvocation> {
    finished
        .iter()
        .filter(|invocation| {
            invocation.name == prefix
                || invocation
                    .name
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('(') || rest.starts_with('@'))
        })
        .collect()
}

pub(crate) fn is_errored(outcome: &Outcome) -> bool {
    matches!(outcome, Outcome::Errored { .. })
}
