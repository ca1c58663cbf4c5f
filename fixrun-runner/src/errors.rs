// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by fixrun-runner.

use crate::filter::RunExplicit;
use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurred while registering fixtures.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two fixtures were registered under the same name.
    #[error("fixture `{fixture}` is registered more than once")]
    DuplicateFixture {
        /// The duplicated fixture name.
        fixture: String,
    },

    /// A fixture declared two cases with the same name.
    #[error("fixture `{fixture}` declares case `{case}` more than once")]
    DuplicateCase {
        /// The fixture name.
        fixture: String,
        /// The duplicated case name.
        case: String,
    },

    /// A case declared a repeat count of zero.
    #[error("case `{fixture}::{case}` declares a repeat count of zero")]
    InvalidRepeatCount {
        /// The fixture name.
        fixture: String,
        /// The case name.
        case: String,
    },
}

/// An error that occurred while building a test filter.
#[derive(Debug, Error)]
#[error("error building name pattern set")]
pub struct TestFilterBuildError {
    #[from]
    source: aho_corasick::BuildError,
}

/// Error returned while parsing a [`RunExplicit`](crate::filter::RunExplicit)
/// value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for run-explicit: {input}\n(known values: {})",
    RunExplicit::variants().join(", "),
)]
pub struct RunExplicitParseError {
    input: String,
}

impl RunExplicitParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Error returned while parsing a
/// [`FailureOutput`](crate::reporter::FailureOutput) value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for failure-output: {input}\n(known values: {})",
    crate::reporter::FailureOutput::variants().join(", "),
)]
pub struct FailureOutputParseError {
    input: String,
}

impl FailureOutputParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Error returned while parsing an
/// [`OutputFormat`](crate::list::OutputFormat) value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized output format: {input}\n(known values: {})",
    crate::list::OutputFormat::variants().join(", "),
)]
pub struct OutputFormatParseError {
    input: String,
}

impl OutputFormatParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while writing an event to its output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),

    /// An error occurred while serializing an event to JSON.
    #[error("error serializing event to JSON")]
    Json(#[source] serde_json::Error),

    /// An error occurred while operating on the file system.
    #[error("error operating on path {file}")]
    Fs {
        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: std::io::Error,
    },

    /// An error occurred while producing JUnit XML.
    #[error("error writing JUnit output to {file}")]
    Junit {
        /// The output file.
        file: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: quick_junit::SerializeError,
    },
}
