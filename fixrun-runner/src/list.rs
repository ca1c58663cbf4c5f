// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The run list: selected cases expanded into concrete invocations.

use crate::{
    errors::{OutputFormatParseError, WriteEventError},
    filter::TestFilter,
    fixture::{Fixture, FixtureRegistry, TestCase},
    params::ParamTuple,
};
use fixrun_metadata::{
    CaseListRecord, FilterMatch, FixtureListRecord, RunListSummary,
};
use owo_colors::{OwoColorize, Style};
use std::{fmt, io, io::Write as _, str::FromStr};

/// The output format for the list operation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// A human-readable listing.
    #[default]
    Plain,

    /// Compact JSON.
    Json,

    /// Indented JSON.
    JsonPretty,
}

impl OutputFormat {
    /// The accepted string values.
    pub fn variants() -> [&'static str; 3] {
        ["plain", "json", "json-pretty"]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonPretty => write!(f, "json-pretty"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            "json-pretty" => Ok(OutputFormat::JsonPretty),
            other => Err(OutputFormatParseError::new(other)),
        }
    }
}

/// The list of invocations for one run: every selected case of every
/// registered fixture, expanded into parameter tuples and repeat iterations.
#[derive(Debug)]
pub struct RunList<'reg> {
    entries: Vec<FixtureEntry<'reg>>,
    invocation_count: usize,
    selected_case_count: usize,
    excluded_case_count: usize,
}

/// One fixture's slice of the run list.
#[derive(Debug)]
pub struct FixtureEntry<'reg> {
    fixture: &'reg Fixture,
    cases: Vec<CaseEntry<'reg>>,
}

/// One case's slice of the run list.
#[derive(Debug)]
pub struct CaseEntry<'reg> {
    case: &'reg TestCase,
    filter_match: FilterMatch,
    tuples: Vec<ParamTuple>,
}

impl<'reg> RunList<'reg> {
    /// Creates a run list by applying the filter to every registered case and
    /// expanding the selected ones.
    pub fn new(registry: &'reg FixtureRegistry, filter: &TestFilter) -> Self {
        let mut invocation_count = 0;
        let mut selected_case_count = 0;
        let mut excluded_case_count = 0;

        let entries = registry
            .fixtures()
            .map(|fixture| {
                let cases = fixture
                    .cases()
                    .iter()
                    .map(|case| {
                        let filter_match = filter.filter_match(fixture, case);
                        let tuples = if filter_match.is_match() {
                            selected_case_count += 1;
                            case.expand()
                        } else {
                            excluded_case_count += 1;
                            Vec::new()
                        };
                        invocation_count += tuples.len() * case.repeat();
                        CaseEntry {
                            case,
                            filter_match,
                            tuples,
                        }
                    })
                    .collect();
                FixtureEntry { fixture, cases }
            })
            .collect();

        tracing::debug!(
            invocation_count,
            selected_case_count,
            excluded_case_count,
            "run list built"
        );

        Self {
            entries,
            invocation_count,
            selected_case_count,
            excluded_case_count,
        }
    }

    /// The number of concrete invocations the selected cases expand into.
    pub fn invocation_count(&self) -> usize {
        self.invocation_count
    }

    /// The number of cases selected by the filter.
    pub fn selected_case_count(&self) -> usize {
        self.selected_case_count
    }

    /// The number of cases excluded by the filter.
    pub fn excluded_case_count(&self) -> usize {
        self.excluded_case_count
    }

    /// The number of registered fixtures.
    pub fn fixture_count(&self) -> usize {
        self.entries.len()
    }

    /// The number of fixtures with at least one selected case.
    pub fn active_fixture_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.has_selected_cases())
            .count()
    }

    /// Iterates over per-fixture entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FixtureEntry<'reg>> {
        self.entries.iter()
    }

    /// Iterates over every invocation, in execution order: declaration order
    /// of fixtures and cases, then parameter-tuple order, then repeat index.
    pub fn iter_invocations(&self) -> impl Iterator<Item = InvocationInstance<'_>> + '_ {
        self.entries.iter().flat_map(|entry| {
            entry.selected_cases().flat_map(move |case_entry| {
                case_entry
                    .tuples
                    .iter()
                    .enumerate()
                    .flat_map(move |(tuple_index, params)| {
                        (0..case_entry.case.repeat()).map(move |repeat_index| {
                            InvocationInstance {
                                fixture: entry.fixture,
                                case: case_entry.case,
                                params,
                                tuple_index,
                                repeat_index,
                            }
                        })
                    })
            })
        })
    }

    /// Produces the serializable summary of this list.
    pub fn to_summary(&self) -> RunListSummary {
        RunListSummary {
            fixture_count: self.fixture_count(),
            selected_case_count: self.selected_case_count,
            excluded_case_count: self.excluded_case_count,
            invocation_count: self.invocation_count,
            fixtures: self
                .entries
                .iter()
                .map(|entry| FixtureListRecord {
                    name: entry.fixture.name().to_owned(),
                    tags: entry.fixture.tags().map(str::to_owned).collect(),
                    cases: entry
                        .cases
                        .iter()
                        .map(|case_entry| CaseListRecord {
                            name: case_entry.case.name().to_owned(),
                            tags: case_entry.case.tags().map(str::to_owned).collect(),
                            filter_match: case_entry.filter_match,
                            invocation_count: case_entry.invocation_count(),
                            skip_reason: case_entry.case.skip_reason().map(str::to_owned),
                            explicit_only: case_entry.case.is_explicit_only(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Writes this list to the given writer in the given format.
    pub fn write(
        &self,
        output_format: OutputFormat,
        writer: &mut impl io::Write,
        colorize: bool,
    ) -> Result<(), WriteEventError> {
        match output_format {
            OutputFormat::Plain => self.write_plain(writer, colorize).map_err(WriteEventError::Io),
            OutputFormat::Json => serde_json::to_writer(writer, &self.to_summary())
                .map_err(WriteEventError::Json),
            OutputFormat::JsonPretty => serde_json::to_writer_pretty(writer, &self.to_summary())
                .map_err(WriteEventError::Json),
        }
    }

    // ---
    // Helper methods
    // ---

    fn write_plain(&self, writer: &mut impl io::Write, colorize: bool) -> io::Result<()> {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        for entry in &self.entries {
            write!(writer, "{}", entry.fixture.name().style(styles.fixture))?;
            writeln!(writer, ":")?;

            for case_entry in &entry.cases {
                write!(
                    writer,
                    "    {}",
                    case_entry.case.name().style(styles.case_name)
                )?;

                let invocations = case_entry.invocation_count();
                if invocations > 1 {
                    write!(writer, " ({invocations} invocations)")?;
                }
                if let Some(reason) = case_entry.case.skip_reason() {
                    write!(writer, " (skip: {reason})")?;
                }
                if case_entry.case.is_explicit_only() {
                    write!(writer, " (explicit-only)")?;
                }
                if let FilterMatch::Mismatch { reason } = case_entry.filter_match {
                    write!(writer, " ({})", format_args!("excluded: {reason}").style(styles.excluded))?;
                }
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

impl<'reg> FixtureEntry<'reg> {
    /// The fixture this entry describes.
    pub fn fixture(&self) -> &'reg Fixture {
        self.fixture
    }

    /// All case entries, selected or not, in declaration order.
    pub fn cases(&self) -> &[CaseEntry<'reg>] {
        &self.cases
    }

    /// Iterates over the selected case entries.
    pub fn selected_cases(&self) -> impl Iterator<Item = &CaseEntry<'reg>> {
        self.cases.iter().filter(|entry| entry.is_selected())
    }

    /// Returns true if the filter selected at least one case.
    pub fn has_selected_cases(&self) -> bool {
        self.cases.iter().any(CaseEntry::is_selected)
    }
}

impl<'reg> CaseEntry<'reg> {
    /// The case this entry describes.
    pub fn case(&self) -> &'reg TestCase {
        self.case
    }

    /// Whether the case matched the filter.
    pub fn filter_match(&self) -> FilterMatch {
        self.filter_match
    }

    /// Returns true if the case matched the filter.
    pub fn is_selected(&self) -> bool {
        self.filter_match.is_match()
    }

    /// The expanded parameter tuples. Empty for excluded cases.
    pub fn tuples(&self) -> &[ParamTuple] {
        &self.tuples
    }

    /// The number of invocations this case contributes to the run.
    pub fn invocation_count(&self) -> usize {
        self.tuples.len() * self.case.repeat()
    }
}

/// One concrete execution of a case: a parameter tuple plus a repeat index.
#[derive(Copy, Clone, Debug)]
pub struct InvocationInstance<'a> {
    /// The enclosing fixture.
    pub fixture: &'a Fixture,

    /// The case being invoked.
    pub case: &'a TestCase,

    /// The parameter tuple. Empty for unparameterized cases.
    pub params: &'a ParamTuple,

    /// Zero-based index of the parameter tuple in expansion order.
    pub tuple_index: usize,

    /// Zero-based repeat iteration.
    pub repeat_index: usize,
}

impl InvocationInstance<'_> {
    /// The declared repeat count of the case.
    pub fn repeat_total(&self) -> usize {
        self.case.repeat()
    }
}

impl fmt::Display for InvocationInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.fixture.name(), self.case.name())?;
        if !self.params.is_empty() {
            write!(f, "{}", self.params)?;
        }
        if self.repeat_total() > 1 {
            write!(f, "@{}/{}", self.repeat_index + 1, self.repeat_total())?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    fixture: Style,
    case_name: Style,
    excluded: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.fixture = Style::new().magenta().bold();
        self.case_name = Style::new().blue().bold();
        self.excluded = Style::new().yellow();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter::TestFilterBuilder, params::ParamSource};
    use pretty_assertions::assert_eq;

    fn registry() -> FixtureRegistry {
        let sample = Fixture::new("sample")
            .with_case(TestCase::new("success", |_cx| Ok(())))
            .with_case(
                TestCase::new("multiply", |_cx| Ok(()))
                    .with_source(ParamSource::new("a", [1, 2, 3]))
                    .with_source(ParamSource::new("b", [4, 5, 6])),
            )
            .with_case(TestCase::new("waits", |_cx| Ok(())).with_repeat(3))
            .with_case(TestCase::new("manual", |_cx| Ok(())).explicit_only());
        FixtureRegistry::new([sample]).expect("valid registry")
    }

    #[test]
    fn counts_and_order() {
        let registry = registry();
        let filter = TestFilter::any();
        let run_list = RunList::new(&registry, &filter);

        // success (1) + multiply (9) + waits (3); manual is excluded.
        assert_eq!(run_list.invocation_count(), 13);
        assert_eq!(run_list.selected_case_count(), 3);
        assert_eq!(run_list.excluded_case_count(), 1);
        assert_eq!(run_list.active_fixture_count(), 1);

        let names: Vec<_> = run_list
            .iter_invocations()
            .map(|instance| instance.to_string())
            .collect();
        assert_eq!(names.len(), 13);
        assert_eq!(names[0], "sample::success");
        assert_eq!(names[1], "sample::multiply(1, 4)");
        assert_eq!(names[10], "sample::waits@1/3");
        assert_eq!(names[12], "sample::waits@3/3");
    }

    #[test]
    fn explicit_selection_by_name() {
        let registry = registry();
        let filter = TestFilterBuilder::default()
            .with_pattern("manual")
            .build()
            .expect("filter built");
        let run_list = RunList::new(&registry, &filter);

        assert_eq!(run_list.invocation_count(), 1);
        let names: Vec<_> = run_list
            .iter_invocations()
            .map(|instance| instance.to_string())
            .collect();
        assert_eq!(names, ["sample::manual"]);
    }

    #[test]
    fn output_format_variants_parse() {
        for &variant in &OutputFormat::variants() {
            variant.parse::<OutputFormat>().expect("variant is valid");
        }
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn write_plain_annotates_cases() {
        use indoc::indoc;

        let registry = registry();
        let run_list = RunList::new(&registry, &TestFilter::any());
        let mut buffer = Vec::new();
        run_list
            .write(OutputFormat::Plain, &mut buffer, false)
            .expect("in-memory write succeeded");

        let expected = indoc! {"
            sample:
                success
                multiply (9 invocations)
                waits (3 invocations)
                manual (explicit-only) (excluded: is explicit-only and was not selected by name)
        "};
        assert_eq!(
            String::from_utf8(buffer).expect("output is valid UTF-8"),
            expected
        );
    }

    #[test]
    fn summary_includes_excluded_cases() {
        let registry = registry();
        let run_list = RunList::new(&registry, &TestFilter::any());
        let summary = run_list.to_summary();

        assert_eq!(summary.fixtures.len(), 1);
        let cases = &summary.fixtures[0].cases;
        assert_eq!(cases.len(), 4);
        let manual = cases.iter().find(|c| c.name == "manual").expect("present");
        assert!(!manual.filter_match.is_match());
        assert_eq!(manual.invocation_count, 0);
        assert!(manual.explicit_only);
    }
}
