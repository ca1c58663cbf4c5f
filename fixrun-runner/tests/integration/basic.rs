// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::{FinishedInvocation, execute_with_filter, invocations_of, is_errored};
use camino_tempfile::Utf8TempDir;
use fixrun_runner::{
    filter::{RunExplicit, TestFilter, TestFilterBuilder},
    list::RunList,
    reporter::JunitAggregator,
    runner::{Outcome, TestRunner},
};
use pretty_assertions::assert_eq;

fn default_run() -> (Vec<FinishedInvocation>, fixrun_runner::runner::RunStats) {
    execute_with_filter(&TestFilter::any())
}

#[test]
fn outcome_count_arithmetic() {
    let (finished, stats) = default_run();

    // Selected cases times expanded parameter count times repeat count:
    //   sample: success 1, expected_raise 1, wait 1, wait_repeat 3,
    //           wait_values 3, values 3, multiply_combinatorial 9,
    //           multiply_sequential 2, ignored_case 1       -> 24
    //   second: 1
    //   each lifecycle-failure fixture: 2                   -> 8
    assert_eq!(finished.len(), 33);
    assert_eq!(stats.initial_invocation_count, 33);
    assert_eq!(stats.finished_count, 33);

    assert_eq!(stats.passed, 27);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.errored, 4);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.expected_failures_observed, 1);
    assert_eq!(stats.expected_failures_not_observed, 0);
    assert_eq!(stats.fixture_hook_errors, 2);
    assert!(!stats.is_success());
}

#[test]
fn combinatorial_expansion_is_full_product() {
    let (finished, _) = default_run();
    let multiply = invocations_of(&finished, "sample::multiply_combinatorial");
    assert_eq!(multiply.len(), 9);
    assert!(multiply.iter().all(|i| i.report.outcome.is_success()));
    assert_eq!(multiply[0].name, "sample::multiply_combinatorial(1, 4)");
    assert_eq!(multiply[8].name, "sample::multiply_combinatorial(3, 6)");
}

#[test]
fn sequential_combination_truncates_to_shortest() {
    let (finished, _) = default_run();
    let sequential = invocations_of(&finished, "sample::multiply_sequential");

    // Sources of length 3, 3, and 2 zip to exactly 2 invocations.
    let names: Vec<_> = sequential.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        [
            r#"sample::multiply_sequential(1, 4, "Ann")"#,
            r#"sample::multiply_sequential(2, 5, "Bob")"#,
        ]
    );
    assert!(sequential[0].report.output.contains("Ann: 1 x 4 = 4"));
    assert!(sequential[1].report.output.contains("Bob: 2 x 5 = 10"));
}

#[test]
fn expected_failure_observed_is_the_only_outcome() {
    let (finished, _) = default_run();
    let expected = invocations_of(&finished, "sample::expected_raise");
    assert_eq!(expected.len(), 1);
    assert!(matches!(
        &expected[0].report.outcome,
        Outcome::ExpectedFailureObserved { kind } if kind.as_str() == sample_fixtures::FAULT
    ));
}

#[test]
fn expected_failure_contract_violations() {
    let filter = TestFilterBuilder::default()
        .with_run_explicit(RunExplicit::All)
        .build()
        .expect("filter built");
    let (finished, stats) = execute_with_filter(&filter);

    // The wrong-kind raise is errored, not treated as observed.
    let wrong_kind = invocations_of(&finished, "sample::expected_raise_wrong_kind");
    assert_eq!(wrong_kind.len(), 1);
    assert!(matches!(&wrong_kind[0].report.outcome, Outcome::Errored { failure }
        if failure.message.contains("expected a failure of kind")));

    // A body that raises nothing breaks the contract.
    let missing = invocations_of(&finished, "sample::missing_expected_raise");
    assert_eq!(missing.len(), 1);
    assert!(matches!(
        missing[0].report.outcome,
        Outcome::ExpectedFailureNotObserved
    ));
    assert_eq!(stats.expected_failures_not_observed, 1);
}

#[test]
fn explicit_only_cases_are_absent_by_default() {
    let (finished, _) = default_run();
    for name in [
        "sample::mismatch",
        "sample::raises",
        "sample::expected_raise_wrong_kind",
        "sample::missing_expected_raise",
        "sample::nil_access",
    ] {
        assert!(
            invocations_of(&finished, name).is_empty(),
            "{name} must not appear in a default run"
        );
    }
}

#[test]
fn explicit_only_case_runs_when_selected_by_name() {
    let filter = TestFilterBuilder::default()
        .with_pattern("nil_access")
        .build()
        .expect("filter built");
    let (finished, stats) = execute_with_filter(&filter);

    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].name, "sample::nil_access");
    assert!(matches!(&finished[0].report.outcome, Outcome::Errored { failure }
        if failure.kind.as_str() == sample_fixtures::FAULT_NIL));
    assert_eq!(stats.errored, 1);
}

#[test]
fn skip_directive_yields_skipped_outcome() {
    let (finished, _) = default_run();
    let ignored = invocations_of(&finished, "sample::ignored_case");
    assert_eq!(ignored.len(), 1);
    assert!(matches!(&ignored[0].report.outcome, Outcome::Skipped { reason }
        if reason == "ignored test"));
    // The raising body never ran.
    assert!(ignored[0].report.output.is_empty());
}

#[test]
fn repeat_count_yields_independent_outcomes() {
    let (finished, _) = default_run();
    let repeats = invocations_of(&finished, "sample::wait_repeat");
    let names: Vec<_> = repeats.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "sample::wait_repeat@1/3",
            "sample::wait_repeat@2/3",
            "sample::wait_repeat@3/3",
        ]
    );
    for invocation in &repeats {
        assert!(invocation.report.outcome.is_success());
        assert!(invocation.report.output.contains("waiting"));
    }
}

#[test]
fn fixture_setup_failure_errors_every_case_without_running_bodies() {
    let (finished, _) = default_run();
    let errored = invocations_of(&finished, "fixture_setup_fails::first")
        .into_iter()
        .chain(invocations_of(&finished, "fixture_setup_fails::second"))
        .collect::<Vec<_>>();

    assert_eq!(errored.len(), 2);
    for invocation in errored {
        assert!(is_errored(&invocation.report.outcome));
        assert!(matches!(&invocation.report.outcome, Outcome::Errored { failure }
            if failure.message.contains("setup of fixture `fixture_setup_fails` failed")));
        // No per-case hooks or bodies ran.
        assert!(invocation.report.output.is_empty());
    }
}

#[test]
fn case_setup_failure_is_errored_per_invocation() {
    let (finished, _) = default_run();
    let errored = invocations_of(&finished, "case_setup_fails::first");
    assert_eq!(errored.len(), 1);
    let report = &errored[0].report;
    assert!(matches!(&report.outcome, Outcome::Errored { failure }
        if failure.message.contains("case_setup")));
    // The base setup hook ran before the failing derived one.
    assert!(report.output.contains("base case setup"));
}

#[test]
fn case_teardown_failure_is_a_secondary_annotation() {
    let (finished, _) = default_run();
    for name in ["case_teardown_fails::first", "case_teardown_fails::second"] {
        let invocations = invocations_of(&finished, name);
        assert_eq!(invocations.len(), 1);
        let report = &invocations[0].report;
        // The primary outcome stays Passed; the teardown failure rides along.
        assert!(matches!(report.outcome, Outcome::Passed));
        let teardown = report.teardown_failure.as_ref().expect("annotation recorded");
        assert!(teardown.message.contains("case_teardown"));
    }
}

#[test]
fn tag_filter_selects_the_waiting_cases() {
    let filter = TestFilterBuilder::default()
        .with_tag("waiting")
        .build()
        .expect("filter built");
    let (finished, stats) = execute_with_filter(&filter);

    // wait 1 + wait_repeat 3 + wait_values 3.
    assert_eq!(finished.len(), 7);
    assert!(stats.is_success());
    assert!(finished.iter().all(|i| i.name.starts_with("sample::wait")));
}

#[test]
fn junit_report_is_written() {
    let temp_dir = Utf8TempDir::new().expect("temp dir created");
    let junit_path = temp_dir.path().join("junit.xml");

    let registry = sample_fixtures::registry().expect("sample registry is valid");
    let filter = TestFilter::any();
    let run_list = RunList::new(&registry, &filter);
    let runner = TestRunner::new(&run_list);

    let mut aggregator = JunitAggregator::new(junit_path.clone(), "sample-run");
    runner
        .try_execute(|event| aggregator.write_event(&event))
        .expect("aggregation succeeded");

    let report = std::fs::read_to_string(&junit_path).expect("report written");
    assert!(report.contains("sample-run"), "report: {report}");
    assert!(report.contains("testsuite"), "report: {report}");
    assert!(report.contains("multiply_combinatorial"), "report: {report}");
    assert!(
        report.contains("fixture-setup-error"),
        "fixture-level failures are recorded as suite properties; report: {report}"
    );
}
