// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for fixrun harness failures.
///
/// A fixture run may fail for a variety of reasons. This structure documents
/// the exit codes that occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum FixrunExitCode {}

impl FixrunExitCode {
    /// No errors occurred and the harness exited normally.
    pub const OK: i32 = 0;

    /// No invocations were selected to run, but no other errors occurred.
    pub const NO_TESTS_RUN: i32 = 4;

    /// One or more invocations failed, errored, or broke an expected-failure
    /// contract, or a fixture-level hook failed.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// A user issue happened while setting up a harness invocation.
    pub const SETUP_ERROR: i32 = 96;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
