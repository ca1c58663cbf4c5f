// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Harness-level errors and their exit codes.

use fixrun_metadata::FixrunExitCode;
use fixrun_runner::errors::{RegistryError, TestFilterBuildError, WriteEventError};
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// An expected harness failure: something went wrong in the fixtures or the
/// invocation, not in the harness itself.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExpectedError {
    /// Fixture registration failed.
    #[error("fixture registration failed")]
    RegistryError {
        /// The underlying error.
        #[from]
        err: RegistryError,
    },

    /// Building the test filter failed.
    #[error("building the test filter failed")]
    FilterBuildError {
        /// The underlying error.
        #[from]
        err: TestFilterBuildError,
    },

    /// Writing output failed.
    #[error("writing output failed")]
    WriteEventError {
        /// The underlying error.
        #[from]
        err: WriteEventError,
    },

    /// No invocations were selected.
    #[error("no invocations were selected to run")]
    NoTestsRun,

    /// One or more invocations did not succeed.
    #[error("the test run failed")]
    TestRunFailed,
}

impl ExpectedError {
    /// Returns the process exit code for this error.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            ExpectedError::RegistryError { .. } | ExpectedError::FilterBuildError { .. } => {
                FixrunExitCode::SETUP_ERROR
            }
            ExpectedError::WriteEventError { .. } => FixrunExitCode::WRITE_OUTPUT_ERROR,
            ExpectedError::NoTestsRun => FixrunExitCode::NO_TESTS_RUN,
            ExpectedError::TestRunFailed => FixrunExitCode::TEST_RUN_FAILED,
        }
    }

    /// Returns the chain of errors, outermost first.
    pub fn error_chain(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
        std::iter::successors(
            Some(self as &(dyn std::error::Error + 'static)),
            |err| err.source(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            ExpectedError::TestRunFailed.process_exit_code(),
            FixrunExitCode::TEST_RUN_FAILED
        );
        assert_eq!(
            ExpectedError::NoTestsRun.process_exit_code(),
            FixrunExitCode::NO_TESTS_RUN
        );
    }

    #[test]
    fn error_chain_includes_source() {
        let err = ExpectedError::from(RegistryError::DuplicateFixture {
            fixture: "sample".to_owned(),
        });
        let chain: Vec<String> = err.error_chain().map(ToString::to_string).collect();
        assert_eq!(chain.len(), 2);
        assert!(chain[1].contains("sample"));
    }
}
