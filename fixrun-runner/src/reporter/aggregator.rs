// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code to generate JUnit XML reports from test events.

use crate::{
    errors::WriteEventError,
    list::InvocationInstance,
    reporter::events::{TestEvent, TestEventKind},
    runner::Outcome,
};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use quick_junit::{NonSuccessKind, Property, Report, TestCase, TestCaseStatus, TestSuite};
use smol_str::SmolStr;
use std::{fmt::Write as _, fs::File};

/// Aggregates test events into a JUnit XML report, written out when the run
/// finishes.
#[derive(Clone, Debug)]
pub struct JunitAggregator {
    report_name: String,
    path: Utf8PathBuf,
    test_suites: IndexMap<SmolStr, TestSuite>,
}

impl JunitAggregator {
    /// Creates an aggregator that will write its report to the given path.
    pub fn new(path: impl Into<Utf8PathBuf>, report_name: impl Into<String>) -> Self {
        Self {
            report_name: report_name.into(),
            path: path.into(),
            test_suites: IndexMap::new(),
        }
    }

    /// Consumes a single event.
    pub fn write_event(&mut self, event: &TestEvent<'_>) -> Result<(), WriteEventError> {
        match &event.kind {
            TestEventKind::RunStarted { .. }
            | TestEventKind::FixtureStarted { .. }
            | TestEventKind::CaseStarted { .. } => {}
            TestEventKind::CaseFinished { instance, report } => {
                let status = testcase_status(&report.outcome);

                let mut testcase = TestCase::new(invocation_label(*instance), status);
                testcase
                    .set_classname(instance.fixture.name())
                    .set_timestamp(report.start_time)
                    .set_time(report.time_taken);
                if !report.output.is_empty() {
                    testcase.set_system_out(report.output.as_str());
                }
                // The teardown annotation never overwrites the primary
                // outcome; it travels in system-err.
                if let Some(teardown_failure) = &report.teardown_failure {
                    testcase.set_system_err(format!("teardown failed: {teardown_failure}"));
                }

                self.testsuite_for(instance.fixture.name())
                    .add_test_case(testcase);
            }
            TestEventKind::FixtureFinished {
                fixture,
                setup_failure,
                teardown_failures,
                output,
            } => {
                if setup_failure.is_none() && teardown_failures.is_empty() && output.is_empty() {
                    return Ok(());
                }
                let testsuite = self.testsuite_for(fixture.name());
                if let Some(failure) = setup_failure {
                    testsuite.add_property(Property::new("fixture-setup-error", failure.to_string()));
                }
                for failure in teardown_failures {
                    testsuite.add_property(Property::new("fixture-teardown-error", failure.to_string()));
                }
                if !output.is_empty() {
                    testsuite.add_property(Property::new("fixture-output", output.clone()));
                }
            }
            TestEventKind::RunFinished {
                start_time,
                elapsed,
                ..
            } => {
                let mut report = Report::new(self.report_name.clone());
                report
                    .set_timestamp(*start_time)
                    .set_time(*elapsed)
                    .add_test_suites(self.test_suites.drain(..).map(|(_, testsuite)| testsuite));

                if let Some(junit_dir) = self.path.parent() {
                    std::fs::create_dir_all(junit_dir).map_err(|error| WriteEventError::Fs {
                        file: junit_dir.to_path_buf(),
                        error,
                    })?;
                }

                let f = File::create(&self.path).map_err(|error| WriteEventError::Fs {
                    file: self.path.clone(),
                    error,
                })?;
                report.serialize(f).map_err(|error| WriteEventError::Junit {
                    file: self.path.clone(),
                    error,
                })?;
            }
        }

        Ok(())
    }

    fn testsuite_for(&mut self, fixture_name: &str) -> &mut TestSuite {
        self.test_suites
            .entry(SmolStr::new(fixture_name))
            .or_insert_with(|| TestSuite::new(fixture_name))
    }
}

/// The JUnit test case name for an invocation: the case name plus its
/// parameter tuple and repeat suffix, without the fixture prefix (that is the
/// suite).
fn invocation_label(instance: InvocationInstance<'_>) -> String {
    let mut label = instance.case.name().to_owned();
    if !instance.params.is_empty() {
        let _ = write!(label, "{}", instance.params);
    }
    if instance.repeat_total() > 1 {
        let _ = write!(
            label,
            "@{}/{}",
            instance.repeat_index + 1,
            instance.repeat_total()
        );
    }
    label
}

fn testcase_status(outcome: &Outcome) -> TestCaseStatus {
    match outcome {
        Outcome::Passed | Outcome::ExpectedFailureObserved { .. } => TestCaseStatus::success(),
        Outcome::Failed { message } => {
            let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
            status.set_type("assertion failure").set_message(message.clone());
            status
        }
        Outcome::ExpectedFailureNotObserved => {
            let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
            status
                .set_type("missing expected failure")
                .set_message("the case completed without raising its expected failure");
            status
        }
        Outcome::TimedOut => {
            let mut status = TestCaseStatus::non_success(NonSuccessKind::Failure);
            status.set_type("timeout");
            status
        }
        Outcome::Errored { failure } => {
            let mut status = TestCaseStatus::non_success(NonSuccessKind::Error);
            status
                .set_type(failure.kind.as_str())
                .set_message(failure.message.clone());
            status
        }
        Outcome::Skipped { reason } => {
            let mut status = TestCaseStatus::skipped();
            status.set_message(format!("Skipped: {reason}"));
            status
        }
    }
}
