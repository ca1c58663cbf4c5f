// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test event model.
//!
//! Events are produced by a [`TestRunner`](crate::runner::TestRunner) and
//! consumed by the reporters in this module.

use crate::{
    failure::Failure,
    fixture::Fixture,
    list::{InvocationInstance, RunList},
    runner::{ExecuteReport, RunStats},
};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// A test event.
#[derive(Clone, Debug)]
pub struct TestEvent<'a> {
    /// The time at which the event was generated, including the offset from
    /// UTC.
    pub timestamp: DateTime<FixedOffset>,

    /// The amount of time elapsed since the start of the run.
    pub elapsed: Duration,

    /// The kind of event this is.
    pub kind: TestEventKind<'a>,
}

/// The kind of test event this is.
///
/// Forms part of [`TestEvent`].
#[derive(Clone, Debug)]
pub enum TestEventKind<'a> {
    /// The run started.
    RunStarted {
        /// The list of invocations that will be run.
        run_list: &'a RunList<'a>,
    },

    /// A fixture instance started; its fixture-setup hooks are about to run.
    FixtureStarted {
        /// The fixture being started.
        fixture: &'a Fixture,
    },

    /// An invocation started running.
    CaseStarted {
        /// The invocation that was started.
        instance: InvocationInstance<'a>,
    },

    /// An invocation finished and produced its outcome.
    CaseFinished {
        /// The invocation that finished.
        instance: InvocationInstance<'a>,

        /// The outcome and associated data.
        report: ExecuteReport,
    },

    /// A fixture instance finished: all its invocations completed and its
    /// fixture-teardown hooks ran.
    FixtureFinished {
        /// The fixture that finished.
        fixture: &'a Fixture,

        /// The fixture-setup failure that short-circuited the instance, if
        /// any.
        setup_failure: Option<Failure>,

        /// Failures raised by fixture-teardown hooks. These never mask a
        /// setup failure.
        teardown_failures: Vec<Failure>,

        /// Diagnostic text captured from fixture-level hooks.
        output: String,
    },

    /// The run finished.
    RunFinished {
        /// The time at which the run started.
        start_time: DateTime<FixedOffset>,

        /// The total time taken by the run.
        elapsed: Duration,

        /// Statistics for the run.
        run_stats: RunStats,
    },
}
