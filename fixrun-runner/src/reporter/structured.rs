// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured, machine-readable reporter output: one JSON object per line.

use crate::{
    errors::WriteEventError,
    reporter::events::{TestEvent, TestEventKind},
};
use fixrun_metadata::StructuredMessage;
use std::io::{self, Write as _};

/// Writes one JSON line per finished invocation, plus a final run-statistics
/// line, for consumption by external reporters.
#[derive(Debug)]
pub struct StructuredReporter<W> {
    writer: W,
}

impl<W: io::Write> StructuredReporter<W> {
    /// Creates a reporter writing to the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes a single event.
    pub fn write_event(&mut self, event: &TestEvent<'_>) -> Result<(), WriteEventError> {
        let message = match &event.kind {
            TestEventKind::CaseFinished { instance, report } => StructuredMessage::Invocation {
                record: report.to_record(*instance),
            },
            TestEventKind::RunFinished { run_stats, .. } => StructuredMessage::RunFinished {
                stats: run_stats.to_summary(),
            },
            _ => return Ok(()),
        };

        serde_json::to_writer(&mut self.writer, &message).map_err(WriteEventError::Json)?;
        writeln!(self.writer).map_err(WriteEventError::Io)
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        filter::TestFilter,
        fixture::{Fixture, FixtureRegistry, TestCase},
        list::RunList,
        runner::TestRunner,
    };
    use fixrun_metadata::OutcomeRecord;

    #[test]
    fn emits_one_line_per_invocation_plus_summary() {
        let fixture = Fixture::new("structured")
            .with_case(TestCase::new("one", |_cx| Ok(())))
            .with_case(TestCase::new("two", |_cx| Ok(())));
        let registry = FixtureRegistry::new([fixture]).expect("valid registry");
        let filter = TestFilter::any();
        let run_list = RunList::new(&registry, &filter);
        let runner = TestRunner::new(&run_list);

        let mut reporter = StructuredReporter::new(Vec::new());
        runner.execute(|event| {
            reporter.write_event(&event).expect("in-memory write succeeded");
        });

        let buffer = reporter.into_inner();
        let lines: Vec<&str> = std::str::from_utf8(&buffer)
            .expect("valid UTF-8")
            .lines()
            .collect();
        assert_eq!(lines.len(), 3);

        let first: StructuredMessage = serde_json::from_str(lines[0]).expect("valid JSON");
        match first {
            StructuredMessage::Invocation { record } => {
                assert_eq!(record.fixture, "structured");
                assert_eq!(record.case, "one");
                assert_eq!(record.outcome, OutcomeRecord::Passed);
            }
            other => panic!("expected invocation message, got {other:?}"),
        }

        let last: StructuredMessage = serde_json::from_str(lines[2]).expect("valid JSON");
        match last {
            StructuredMessage::RunFinished { stats } => {
                assert_eq!(stats.finished_count, 2);
                assert_eq!(stats.passed, 2);
            }
            other => panic!("expected run-finished message, got {other:?}"),
        }
    }
}
