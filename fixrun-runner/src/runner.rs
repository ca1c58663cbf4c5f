// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sequential executor.
//!
//! One invocation runs to completion, including its hooks, before the next
//! begins. Test and hook failures never abort the run; the only thing that
//! stops it early is the event callback returning an error.

use crate::{
    failure::{Failure, FailureKind},
    fixture::{CaseContext, ExpectedFailure, Fixture, Hook, HookContext, TestCase},
    list::{InvocationInstance, RunList},
    reporter::events::{TestEvent, TestEventKind},
    state::FixtureState,
    time::{StopwatchStart, stopwatch},
};
use chrono::{DateTime, FixedOffset};
use fixrun_metadata::{InvocationRecord, OutcomeRecord, RunStatsSummary};
use std::{
    convert::Infallible,
    fmt::Write as _,
    marker::PhantomData,
    panic::{AssertUnwindSafe, catch_unwind},
    time::Duration,
};
use tracing::debug;

/// The terminal outcome of one invocation.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// The case body completed without raising a failure.
    Passed,

    /// The case body raised an assertion-style failure.
    Failed {
        /// Description of the mismatch.
        message: String,
    },

    /// A non-assertion failure was raised, by the case body or by a hook.
    Errored {
        /// The raised failure.
        failure: Failure,
    },

    /// The case carries a skip directive and was not executed.
    Skipped {
        /// The declared skip reason.
        reason: String,
    },

    /// A failure matching the case's expected-failure directive was raised.
    /// Treated as success.
    ExpectedFailureObserved {
        /// The kind of the raised failure.
        kind: FailureKind,
    },

    /// The case declared an expected failure but raised nothing. Treated as
    /// failure.
    ExpectedFailureNotObserved,

    /// Reserved for runners that add deadlines. The sequential runner never
    /// produces this.
    TimedOut,
}

impl Outcome {
    /// Returns true if this outcome counts as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Passed | Outcome::ExpectedFailureObserved { .. }
        )
    }

    /// The fixed-width status word shown by the console displayer.
    pub fn status_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASS",
            Outcome::Failed { .. } => "FAIL",
            Outcome::Errored { .. } => "ERROR",
            Outcome::Skipped { .. } => "SKIP",
            Outcome::ExpectedFailureObserved { .. } => "XFAIL",
            Outcome::ExpectedFailureNotObserved => "XPASS",
            Outcome::TimedOut => "TIMEOUT",
        }
    }

    /// Converts to the serializable record form.
    pub fn to_record(&self) -> OutcomeRecord {
        match self {
            Outcome::Passed => OutcomeRecord::Passed,
            Outcome::Failed { message } => OutcomeRecord::Failed {
                message: message.clone(),
            },
            Outcome::Errored { failure } => OutcomeRecord::Errored {
                kind: failure.kind.as_str().to_owned(),
                message: failure.message.clone(),
            },
            Outcome::Skipped { reason } => OutcomeRecord::Skipped {
                reason: reason.clone(),
            },
            Outcome::ExpectedFailureObserved { kind } => OutcomeRecord::ExpectedFailureObserved {
                kind: kind.as_str().to_owned(),
            },
            Outcome::ExpectedFailureNotObserved => OutcomeRecord::ExpectedFailureNotObserved,
            Outcome::TimedOut => OutcomeRecord::TimedOut,
        }
    }
}

/// Information about a single invocation that finished running.
#[derive(Clone, Debug)]
pub struct ExecuteReport {
    /// The terminal outcome.
    pub outcome: Outcome,

    /// Failure raised by a per-case teardown hook after the primary outcome
    /// was decided. Never overwrites the outcome.
    pub teardown_failure: Option<Failure>,

    /// Diagnostic text captured from per-case hooks and the case body.
    pub output: String,

    /// The time at which the invocation started.
    pub start_time: DateTime<FixedOffset>,

    /// Wall-clock time taken, including hooks.
    pub time_taken: Duration,
}

impl ExecuteReport {
    /// Converts to the serializable record form for the given invocation.
    pub fn to_record(&self, instance: InvocationInstance<'_>) -> InvocationRecord {
        InvocationRecord {
            fixture: instance.fixture.name().to_owned(),
            case: instance.case.name().to_owned(),
            params: instance.params.display_values(),
            repeat_index: instance.repeat_index,
            repeat_total: instance.repeat_total(),
            outcome: self.outcome.to_record(),
            teardown_error: self.teardown_failure.as_ref().map(ToString::to_string),
            output: self.output.clone(),
            start_time: self.start_time,
            time_taken: self.time_taken,
        }
    }
}

/// Statistics for a test run.
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq)]
pub struct RunStats {
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

impl RunStats {
    /// Returns true if this run is considered a success.
    ///
    /// A run is marked as failed if any of the following are true:
    /// * the run finished early: fewer outcomes than expected
    /// * any invocation failed, errored, or broke its expected-failure
    ///   contract
    /// * any fixture-level hook failed
    pub fn is_success(&self) -> bool {
        if self.finished_count < self.initial_invocation_count {
            return false;
        }
        if self.failed > 0 || self.errored > 0 || self.expected_failures_not_observed > 0 {
            return false;
        }
        if self.fixture_hook_errors > 0 {
            return false;
        }
        true
    }

    /// Converts to the serializable summary form.
    pub fn to_summary(&self) -> RunStatsSummary {
        RunStatsSummary {
            initial_invocation_count: self.initial_invocation_count,
            finished_count: self.finished_count,
            passed: self.passed,
            failed: self.failed,
            errored: self.errored,
            skipped: self.skipped,
            expected_failures_observed: self.expected_failures_observed,
            expected_failures_not_observed: self.expected_failures_not_observed,
            fixture_hook_errors: self.fixture_hook_errors,
        }
    }

    fn on_case_finished(&mut self, report: &ExecuteReport) {
        self.finished_count += 1;
        match &report.outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Errored { .. } | Outcome::TimedOut => self.errored += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::ExpectedFailureObserved { .. } => self.expected_failures_observed += 1,
            Outcome::ExpectedFailureNotObserved => self.expected_failures_not_observed += 1,
        }
    }
}

/// Context for running tests.
///
/// Created with [`TestRunner::new`].
pub struct TestRunner<'list> {
    run_list: &'list RunList<'list>,
}

impl<'list> TestRunner<'list> {
    /// Creates a new runner over the given run list.
    pub fn new(run_list: &'list RunList<'list>) -> Self {
        Self { run_list }
    }

    /// Executes the listed invocations sequentially.
    ///
    /// The callback is called with an event stream describing the run.
    pub fn execute<F>(&self, mut callback: F) -> RunStats
    where
        F: FnMut(TestEvent<'list>),
    {
        self.try_execute::<Infallible, _>(|event| {
            callback(event);
            Ok(())
        })
        .expect("Err branch is infallible")
    }

    /// Executes the listed invocations sequentially, with a fallible event
    /// callback.
    ///
    /// The first callback error cancels the rest of the run and is returned.
    /// Test and hook failures never cancel the run.
    pub fn try_execute<E, F>(&self, callback: F) -> Result<RunStats, E>
    where
        F: FnMut(TestEvent<'list>) -> Result<(), E>,
    {
        let mut ctx = CallbackContext::new(callback, self.run_list.invocation_count());

        ctx.run_started(self.run_list)?;

        for entry in self.run_list.iter() {
            if !entry.has_selected_cases() {
                continue;
            }
            let fixture = entry.fixture();
            debug!(fixture = fixture.name(), "starting fixture instance");
            ctx.fixture_started(fixture)?;

            // One fixture instance per run: one state, one fixture-level
            // output buffer, one setup/teardown cycle.
            let mut state = FixtureState::new();
            let mut fixture_output = String::new();

            let mut setup_failure = None;
            for hook in fixture.fixture_setup_hooks() {
                let mut cx = HookContext::new(fixture.name(), &mut state, &mut fixture_output);
                if let Err(failure) = run_hook(hook, &mut cx) {
                    debug!(
                        fixture = fixture.name(),
                        hook = hook.name(),
                        "fixture setup failed, short-circuiting cases"
                    );
                    setup_failure = Some(failure);
                    break;
                }
            }

            for case_entry in entry.selected_cases() {
                let case = case_entry.case();
                for (tuple_index, params) in case_entry.tuples().iter().enumerate() {
                    for repeat_index in 0..case.repeat() {
                        let instance = InvocationInstance {
                            fixture,
                            case,
                            params,
                            tuple_index,
                            repeat_index,
                        };
                        ctx.case_started(instance)?;

                        let report = if let Some(failure) = &setup_failure {
                            fixture_error_report(fixture, failure)
                        } else if let Some(reason) = case.skip_reason() {
                            // Skipped invocations run no hooks at all.
                            skip_report(reason)
                        } else {
                            run_case(fixture, case, instance, &mut state)
                        };

                        ctx.case_finished(instance, report)?;
                    }
                }
            }

            // Fixture teardown is best-effort: it runs even after a setup
            // failure, and its own failures never mask the setup failure.
            let mut teardown_failures = Vec::new();
            for hook in fixture.fixture_teardown_hooks().iter().rev() {
                let mut cx = HookContext::new(fixture.name(), &mut state, &mut fixture_output);
                if let Err(failure) = run_hook(hook, &mut cx) {
                    teardown_failures.push(failure);
                }
            }

            ctx.fixture_finished(fixture, setup_failure, teardown_failures, fixture_output)?;
        }

        ctx.run_finished()
    }
}

/// Runs a hook, trapping panics, and names the hook in any failure message.
fn run_hook(hook: &Hook, cx: &mut HookContext<'_>) -> Result<(), Failure> {
    let result = match catch_unwind(AssertUnwindSafe(|| hook.call(cx))) {
        Ok(result) => result,
        Err(payload) => Err(Failure::from_panic(payload)),
    };
    result.map_err(|failure| Failure {
        kind: failure.kind,
        message: format!("hook `{}`: {}", hook.name(), failure.message),
    })
}

fn fixture_error_report(fixture: &Fixture, setup_failure: &Failure) -> ExecuteReport {
    let snapshot = stopwatch().snapshot();
    ExecuteReport {
        outcome: Outcome::Errored {
            failure: Failure {
                kind: setup_failure.kind.clone(),
                message: format!(
                    "setup of fixture `{}` failed: {}",
                    fixture.name(),
                    setup_failure.message
                ),
            },
        },
        teardown_failure: None,
        output: String::new(),
        start_time: snapshot.start_time.fixed_offset(),
        time_taken: snapshot.duration,
    }
}

fn skip_report(reason: &str) -> ExecuteReport {
    let snapshot = stopwatch().snapshot();
    ExecuteReport {
        outcome: Outcome::Skipped {
            reason: reason.to_owned(),
        },
        teardown_failure: None,
        output: String::new(),
        start_time: snapshot.start_time.fixed_offset(),
        time_taken: snapshot.duration,
    }
}

fn run_case(
    fixture: &Fixture,
    case: &TestCase,
    instance: InvocationInstance<'_>,
    state: &mut FixtureState,
) -> ExecuteReport {
    let stopwatch = stopwatch();
    let mut output = String::new();

    let mut setup_failure = None;
    for hook in fixture.case_setup_hooks() {
        let mut cx = HookContext::new(fixture.name(), state, &mut output);
        if let Err(failure) = run_hook(hook, &mut cx) {
            setup_failure = Some(failure);
            break;
        }
    }

    let outcome = match setup_failure {
        Some(failure) => Outcome::Errored { failure },
        None => {
            let raised = {
                let mut cx = CaseContext::new(
                    fixture.name(),
                    case.name(),
                    instance.params,
                    instance.repeat_index,
                    case.repeat(),
                    state,
                    &mut output,
                );
                match catch_unwind(AssertUnwindSafe(|| case.call(&mut cx))) {
                    Ok(Ok(())) => None,
                    Ok(Err(failure)) => Some(failure),
                    Err(payload) => Some(Failure::from_panic(payload)),
                }
            };
            decide_outcome(case.expected_failure(), raised)
        }
    };

    // Teardown always runs, even when setup failed: hooks that acquired
    // resources before the failing one must get a chance to release them.
    let mut teardown_failure: Option<Failure> = None;
    for hook in fixture.case_teardown_hooks().iter().rev() {
        let mut cx = HookContext::new(fixture.name(), state, &mut output);
        if let Err(failure) = run_hook(hook, &mut cx) {
            if teardown_failure.is_none() {
                teardown_failure = Some(failure);
            } else {
                let _ = writeln!(output, "additional teardown failure: {failure}");
            }
        }
    }

    let snapshot = stopwatch.snapshot();
    ExecuteReport {
        outcome,
        teardown_failure,
        output,
        start_time: snapshot.start_time.fixed_offset(),
        time_taken: snapshot.duration,
    }
}

fn decide_outcome(expected: Option<&ExpectedFailure>, raised: Option<Failure>) -> Outcome {
    match (expected, raised) {
        (None, None) => Outcome::Passed,
        (None, Some(failure)) => {
            if failure.is_assertion() {
                Outcome::Failed {
                    message: failure.message,
                }
            } else {
                Outcome::Errored { failure }
            }
        }
        (Some(expected), Some(failure)) => {
            if expected.matches(&failure.kind) {
                Outcome::ExpectedFailureObserved { kind: failure.kind }
            } else {
                let declared = expected
                    .kind()
                    .map_or_else(|| "any".to_owned(), ToString::to_string);
                Outcome::Errored {
                    failure: Failure {
                        kind: failure.kind.clone(),
                        message: format!(
                            "expected a failure of kind `{declared}`, but `{}` was raised: {}",
                            failure.kind, failure.message
                        ),
                    },
                }
            }
        }
        (Some(_), None) => Outcome::ExpectedFailureNotObserved,
    }
}

struct CallbackContext<F, E> {
    callback: F,
    stopwatch: StopwatchStart,
    run_stats: RunStats,
    phantom: PhantomData<E>,
}

impl<'list, F, E> CallbackContext<F, E>
where
    F: FnMut(TestEvent<'list>) -> Result<(), E>,
{
    fn new(callback: F, initial_invocation_count: usize) -> Self {
        Self {
            callback,
            stopwatch: stopwatch(),
            run_stats: RunStats {
                initial_invocation_count,
                ..RunStats::default()
            },
            phantom: PhantomData,
        }
    }

    fn emit(&mut self, kind: TestEventKind<'list>) -> Result<(), E> {
        let event = TestEvent {
            timestamp: chrono::Local::now().fixed_offset(),
            elapsed: self.stopwatch.elapsed(),
            kind,
        };
        (self.callback)(event)
    }

    fn run_started(&mut self, run_list: &'list RunList<'list>) -> Result<(), E> {
        self.emit(TestEventKind::RunStarted { run_list })
    }

    fn fixture_started(&mut self, fixture: &'list Fixture) -> Result<(), E> {
        self.emit(TestEventKind::FixtureStarted { fixture })
    }

    fn case_started(&mut self, instance: InvocationInstance<'list>) -> Result<(), E> {
        self.emit(TestEventKind::CaseStarted { instance })
    }

    fn case_finished(
        &mut self,
        instance: InvocationInstance<'list>,
        report: ExecuteReport,
    ) -> Result<(), E> {
        self.run_stats.on_case_finished(&report);
        self.emit(TestEventKind::CaseFinished { instance, report })
    }

    fn fixture_finished(
        &mut self,
        fixture: &'list Fixture,
        setup_failure: Option<Failure>,
        teardown_failures: Vec<Failure>,
        output: String,
    ) -> Result<(), E> {
        self.run_stats.fixture_hook_errors +=
            usize::from(setup_failure.is_some()) + teardown_failures.len();
        self.emit(TestEventKind::FixtureFinished {
            fixture,
            setup_failure,
            teardown_failures,
            output,
        })
    }

    fn run_finished(&mut self) -> Result<RunStats, E> {
        let snapshot = self.stopwatch.snapshot();
        let run_stats = self.run_stats;
        self.emit(TestEventKind::RunFinished {
            start_time: snapshot.start_time.fixed_offset(),
            elapsed: snapshot.duration,
            run_stats,
        })?;
        Ok(run_stats)
    }
}
