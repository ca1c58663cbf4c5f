// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Functionality to report test events to a console writer.

use crate::{
    errors::WriteEventError,
    helpers::{DisplayBracketedDuration, plural},
    list::InvocationInstance,
    reporter::events::{TestEvent, TestEventKind},
    runner::Outcome,
};
use owo_colors::{OwoColorize, Style};
use std::{fmt, io, io::Write as _, str::FromStr};

/// When to print captured output for non-successful invocations.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FailureOutput {
    /// Print output immediately after the invocation finishes.
    #[default]
    Immediate,

    /// Never print captured output.
    Never,
}

impl FailureOutput {
    /// The accepted string values.
    pub fn variants() -> [&'static str; 2] {
        ["immediate", "never"]
    }
}

impl fmt::Display for FailureOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureOutput::Immediate => write!(f, "immediate"),
            FailureOutput::Never => write!(f, "never"),
        }
    }
}

impl FromStr for FailureOutput {
    type Err = crate::errors::FailureOutputParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(FailureOutput::Immediate),
            "never" => Ok(FailureOutput::Never),
            other => Err(crate::errors::FailureOutputParseError::new(other)),
        }
    }
}

/// Builder for [`TestReporter`].
#[derive(Clone, Debug, Default)]
pub struct TestReporterBuilder {
    failure_output: FailureOutput,
    colorize: bool,
}

impl TestReporterBuilder {
    /// Sets when captured output is printed for non-successful invocations.
    pub fn set_failure_output(&mut self, failure_output: FailureOutput) -> &mut Self {
        self.failure_output = failure_output;
        self
    }

    /// Enables or disables ANSI color output.
    pub fn set_colorize(&mut self, colorize: bool) -> &mut Self {
        self.colorize = colorize;
        self
    }

    /// Builds the reporter.
    pub fn build(&self) -> TestReporter {
        let mut styles = Styles::default();
        if self.colorize {
            styles.colorize();
        }
        TestReporter {
            styles,
            failure_output: self.failure_output,
        }
    }
}

/// Reports test events to a console writer, one line per finished invocation.
#[derive(Debug)]
pub struct TestReporter {
    styles: Styles,
    failure_output: FailureOutput,
}

impl TestReporter {
    /// Reports a single event.
    pub fn report_event(
        &mut self,
        event: &TestEvent<'_>,
        writer: &mut impl io::Write,
    ) -> Result<(), WriteEventError> {
        self.write_event(event, writer).map_err(WriteEventError::Io)
    }

    // ---
    // Helper methods
    // ---

    fn write_event(
        &mut self,
        event: &TestEvent<'_>,
        writer: &mut impl io::Write,
    ) -> io::Result<()> {
        match &event.kind {
            TestEventKind::RunStarted { run_list } => {
                write!(writer, "{:>12} ", "Starting".style(self.styles.pass))?;

                let invocation_count = run_list.invocation_count();
                let fixture_count = run_list.active_fixture_count();
                write!(
                    writer,
                    "{} {} across {} {}",
                    invocation_count.style(self.styles.count),
                    plural::invocations_str(invocation_count),
                    fixture_count.style(self.styles.count),
                    plural::fixtures_str(fixture_count),
                )?;

                let excluded = run_list.excluded_case_count();
                if excluded > 0 {
                    write!(
                        writer,
                        " ({} {} excluded)",
                        excluded.style(self.styles.count),
                        plural::cases_str(excluded),
                    )?;
                }
                writeln!(writer)?;
            }
            TestEventKind::FixtureStarted { .. } | TestEventKind::CaseStarted { .. } => {}
            TestEventKind::CaseFinished { instance, report } => {
                let status_style = self.status_style(&report.outcome);
                write!(
                    writer,
                    "{:>12} ",
                    report.outcome.status_str().style(status_style)
                )?;
                write!(writer, "{}", DisplayBracketedDuration(report.time_taken))?;
                self.write_instance(*instance, writer)?;
                if let Some(teardown_failure) = &report.teardown_failure {
                    write!(
                        writer,
                        " ({})",
                        format_args!("teardown failed: {teardown_failure}")
                            .style(self.styles.fail)
                    )?;
                }
                writeln!(writer)?;

                if !report.outcome.is_success()
                    && !matches!(report.outcome, Outcome::Skipped { .. })
                    && self.failure_output == FailureOutput::Immediate
                {
                    self.write_failure_detail(instance, report, writer)?;
                }
            }
            TestEventKind::FixtureFinished {
                fixture,
                setup_failure,
                teardown_failures,
                output: _,
            } => {
                if let Some(failure) = setup_failure {
                    write!(writer, "{:>12} ", "ERROR".style(self.styles.fail))?;
                    writeln!(
                        writer,
                        "setup of fixture {} failed: {failure}",
                        fixture.name().style(self.styles.fixture),
                    )?;
                }
                for failure in teardown_failures {
                    write!(writer, "{:>12} ", "ERROR".style(self.styles.fail))?;
                    writeln!(
                        writer,
                        "teardown of fixture {} failed: {failure}",
                        fixture.name().style(self.styles.fixture),
                    )?;
                }
            }
            TestEventKind::RunFinished {
                elapsed, run_stats, ..
            } => {
                let summary_style = if run_stats.is_success() {
                    self.styles.pass
                } else {
                    self.styles.fail
                };
                write!(writer, "{:>12} ", "Summary".style(summary_style))?;
                write!(writer, "{}", DisplayBracketedDuration(*elapsed))?;

                write!(
                    writer,
                    "{} {} run: {} {}",
                    run_stats.finished_count.style(self.styles.count),
                    plural::invocations_str(run_stats.finished_count),
                    run_stats.passed.style(self.styles.count),
                    "passed".style(self.styles.pass),
                )?;
                if run_stats.expected_failures_observed > 0 {
                    write!(
                        writer,
                        " ({} expected {})",
                        run_stats.expected_failures_observed.style(self.styles.count),
                        "failures observed".style(self.styles.pass),
                    )?;
                }
                if run_stats.failed > 0 {
                    write!(
                        writer,
                        ", {} {}",
                        run_stats.failed.style(self.styles.count),
                        "failed".style(self.styles.fail),
                    )?;
                }
                if run_stats.errored > 0 {
                    write!(
                        writer,
                        ", {} {}",
                        run_stats.errored.style(self.styles.count),
                        "errored".style(self.styles.fail),
                    )?;
                }
                if run_stats.expected_failures_not_observed > 0 {
                    write!(
                        writer,
                        ", {} {}",
                        run_stats
                            .expected_failures_not_observed
                            .style(self.styles.count),
                        "missing expected failures".style(self.styles.fail),
                    )?;
                }
                write!(
                    writer,
                    ", {} {}",
                    run_stats.skipped.style(self.styles.count),
                    "skipped".style(self.styles.skip),
                )?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }

    fn write_instance(
        &self,
        instance: InvocationInstance<'_>,
        writer: &mut impl io::Write,
    ) -> io::Result<()> {
        write!(
            writer,
            "{}{}{}",
            instance.fixture.name().style(self.styles.fixture),
            "::",
            instance.case.name().style(self.styles.case_name),
        )?;
        if !instance.params.is_empty() {
            write!(writer, "{}", instance.params)?;
        }
        if instance.repeat_total() > 1 {
            write!(
                writer,
                "@{}/{}",
                instance.repeat_index + 1,
                instance.repeat_total()
            )?;
        }
        Ok(())
    }

    fn write_failure_detail(
        &self,
        instance: &InvocationInstance<'_>,
        report: &crate::runner::ExecuteReport,
        writer: &mut impl io::Write,
    ) -> io::Result<()> {
        let detail = match &report.outcome {
            Outcome::Failed { message } => message.clone(),
            Outcome::Errored { failure } => failure.to_string(),
            Outcome::ExpectedFailureNotObserved => {
                "the case completed without raising its expected failure".to_owned()
            }
            Outcome::TimedOut => "the invocation timed out".to_owned(),
            Outcome::Passed | Outcome::Skipped { .. } | Outcome::ExpectedFailureObserved { .. } => {
                return Ok(());
            }
        };

        write!(writer, "\n--- {}: ", "DETAIL".style(self.styles.fail))?;
        self.write_instance(*instance, writer)?;
        writeln!(writer, " ---")?;
        writeln!(writer, "{detail}")?;

        if !report.output.is_empty() {
            write!(writer, "--- {}: ", "OUTPUT".style(self.styles.fail))?;
            self.write_instance(*instance, writer)?;
            writeln!(writer, " ---")?;
            write!(writer, "{}", report.output)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn status_style(&self, outcome: &Outcome) -> Style {
        match outcome {
            Outcome::Passed | Outcome::ExpectedFailureObserved { .. } => self.styles.pass,
            Outcome::Failed { .. }
            | Outcome::Errored { .. }
            | Outcome::ExpectedFailureNotObserved
            | Outcome::TimedOut => self.styles.fail,
            Outcome::Skipped { .. } => self.styles.skip,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    count: Style,
    pass: Style,
    fail: Style,
    skip: Style,
    fixture: Style,
    case_name: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.count = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
        self.fixture = Style::new().magenta().bold();
        self.case_name = Style::new().blue().bold();
    }
}
