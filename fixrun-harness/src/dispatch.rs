// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument parsing and command dispatch for fixture binaries.

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use fixrun_runner::{
    errors::{RegistryError, WriteEventError},
    filter::{RunExplicit, TestFilter, TestFilterBuilder},
    fixture::FixtureRegistry,
    list::{OutputFormat, RunList},
    reporter::{FailureOutput, JunitAggregator, TestReporterBuilder},
    runner::TestRunner,
};
use owo_colors::OwoColorize;
use std::{io, process::ExitCode};
use tracing::debug;

/// The command-line surface of a fixture binary.
#[derive(Debug, Parser)]
#[command(
    name = "fixrun",
    about = "Runs statically registered test fixtures",
    version
)]
pub struct HarnessApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List fixtures and cases
    List {
        /// Output format
        #[arg(short = 'T', long, value_enum, default_value_t, value_name = "FMT")]
        format: FormatOpt,

        #[command(flatten)]
        filter: FilterOpts,
    },
    /// Run the selected invocations
    Run {
        #[command(flatten)]
        filter: FilterOpts,

        #[command(flatten)]
        reporter: ReporterOpts,
    },
}

#[derive(Debug, Args)]
struct FilterOpts {
    /// Only select cases carrying this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// How explicit-only cases take part in the run
    #[arg(long, value_enum, default_value_t, value_name = "MODE")]
    run_explicit: RunExplicitOpt,

    /// Name-substring patterns matched against fixture::case paths
    patterns: Vec<String>,
}

impl FilterOpts {
    fn build(&self) -> Result<TestFilter> {
        let mut builder = TestFilterBuilder::default();
        for tag in &self.tags {
            builder = builder.with_tag(tag);
        }
        for pattern in &self.patterns {
            builder = builder.with_pattern(pattern.clone());
        }
        builder = builder.with_run_explicit(self.run_explicit.into());
        Ok(builder.build()?)
    }
}

#[derive(Debug, Args)]
struct ReporterOpts {
    /// Output captured text for non-successful invocations
    #[arg(long, value_enum, default_value_t, value_name = "WHEN")]
    failure_output: FailureOutputOpt,

    /// Write a JUnit XML report to this path
    #[arg(long, value_name = "PATH")]
    junit: Option<Utf8PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum RunExplicitOpt {
    #[default]
    Default,
    All,
    ExplicitOnly,
}

impl From<RunExplicitOpt> for RunExplicit {
    fn from(opt: RunExplicitOpt) -> Self {
        match opt {
            RunExplicitOpt::Default => RunExplicit::Default,
            RunExplicitOpt::All => RunExplicit::All,
            RunExplicitOpt::ExplicitOnly => RunExplicit::ExplicitOnly,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum FormatOpt {
    #[default]
    Plain,
    Json,
    JsonPretty,
}

impl From<FormatOpt> for OutputFormat {
    fn from(opt: FormatOpt) -> Self {
        match opt {
            FormatOpt::Plain => OutputFormat::Plain,
            FormatOpt::Json => OutputFormat::Json,
            FormatOpt::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum FailureOutputOpt {
    #[default]
    Immediate,
    Never,
}

impl From<FailureOutputOpt> for FailureOutput {
    fn from(opt: FailureOutputOpt) -> Self {
        match opt {
            FailureOutputOpt::Immediate => FailureOutput::Immediate,
            FailureOutputOpt::Never => FailureOutput::Never,
        }
    }
}

impl HarnessApp {
    /// Executes the parsed command against the given registry.
    pub fn exec(self, registry: &FixtureRegistry) -> Result<()> {
        let ctx = self.output.init();
        self.exec_with(ctx, registry)
    }

    fn exec_with(self, ctx: OutputContext, registry: &FixtureRegistry) -> Result<()> {
        match self.command {
            Command::List { format, filter } => {
                let filter = filter.build()?;
                let run_list = RunList::new(registry, &filter);
                let colorize = ctx.color.should_colorize(supports_color::Stream::Stdout);
                let mut stdout = io::stdout().lock();
                run_list.write(format.into(), &mut stdout, colorize)?;
                Ok(())
            }
            Command::Run { filter, reporter } => {
                let filter = filter.build()?;
                let run_list = RunList::new(registry, &filter);
                if run_list.invocation_count() == 0 {
                    return Err(ExpectedError::NoTestsRun);
                }
                debug!(
                    invocations = run_list.invocation_count(),
                    "starting fixture run"
                );

                let mut builder = TestReporterBuilder::default();
                builder
                    .set_failure_output(reporter.failure_output.into())
                    .set_colorize(ctx.color.should_colorize(supports_color::Stream::Stdout));
                let mut displayer = builder.build();
                let mut junit = reporter
                    .junit
                    .map(|path| JunitAggregator::new(path, "fixrun-run"));

                let runner = TestRunner::new(&run_list);
                let mut stdout = io::stdout().lock();
                let stats = runner
                    .try_execute(|event| {
                        displayer.report_event(&event, &mut stdout)?;
                        if let Some(aggregator) = &mut junit {
                            aggregator.write_event(&event)?;
                        }
                        Ok::<(), WriteEventError>(())
                    })
                    .map_err(ExpectedError::from)?;

                if stats.is_success() {
                    Ok(())
                } else {
                    Err(ExpectedError::TestRunFailed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_is_well_formed() {
        HarnessApp::command().debug_assert();
    }

    #[test]
    fn run_args_parse() {
        let app = HarnessApp::try_parse_from([
            "demo",
            "run",
            "--tag",
            "waiting",
            "--junit",
            "target/junit.xml",
            "--failure-output",
            "never",
            "wait",
        ])
        .expect("args parse");

        match app.command {
            Command::Run { filter, reporter } => {
                assert_eq!(filter.tags, ["waiting"]);
                assert_eq!(filter.patterns, ["wait"]);
                assert_eq!(filter.run_explicit, RunExplicitOpt::Default);
                assert_eq!(reporter.failure_output, FailureOutputOpt::Never);
                assert_eq!(
                    reporter.junit,
                    Some(Utf8PathBuf::from("target/junit.xml"))
                );
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn list_args_parse() {
        let app = HarnessApp::try_parse_from(["demo", "list", "-T", "json-pretty"])
            .expect("args parse");
        match app.command {
            Command::List { format, .. } => assert_eq!(format, FormatOpt::JsonPretty),
            other => panic!("expected list command, got {other:?}"),
        }
    }
}

/// Parses arguments, runs the harness over the given registry result, and
/// returns the process exit code.
///
/// This is the function the [`harness!`](crate::harness) macro expands to.
pub fn run_harness(registry: std::result::Result<FixtureRegistry, RegistryError>) -> ExitCode {
    let app = HarnessApp::parse();
    let ctx = app.output.init();

    let result = match registry {
        Ok(registry) => app.exec_with(ctx, &registry),
        Err(err) => Err(ExpectedError::from(err)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let styles = ctx.stderr_styles();
            let mut chain = err.error_chain();
            if let Some(top) = chain.next() {
                eprintln!("{}: {top}", "error".style(styles.error));
            }
            for cause in chain {
                eprintln!("{}: {cause}", "caused by".style(styles.bold));
            }
            ExitCode::from(u8::try_from(err.process_exit_code()).unwrap_or(1))
        }
    }
}
