// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! `fixrun-harness` turns a statically registered fixture set into a test
//! binary with a command-line surface: listing, filtering, and running, with
//! console, JUnit, and structured output.
//!
//! In order to set up a fixture binary you must do the following:
//!
//! 1. Configure the test target by setting the following in `Cargo.toml`:
//!
//! ```toml
//! [[test]]
//! name = "<test target name>"
//! harness = false
//! ```
//!
//! 2. Call the `fixrun_harness::harness!(registry_fn)` macro, where
//!    `registry_fn` is a function with the type
//!    `fn() -> Result<FixtureRegistry, RegistryError>` returning the fixtures
//!    to expose.
//!
//! # Examples
//!
//! ```no_run
//! use fixrun_runner::{
//!     errors::RegistryError,
//!     fixture::{Fixture, FixtureRegistry, TestCase},
//! };
//!
//! fn registry() -> Result<FixtureRegistry, RegistryError> {
//!     FixtureRegistry::new([
//!         Fixture::new("smoke").with_case(TestCase::new("passes", |_cx| Ok(()))),
//!     ])
//! }
//!
//! fixrun_harness::harness!(registry);
//! ```

mod dispatch;
mod errors;
mod macros;
mod output;

pub use dispatch::{HarnessApp, run_harness};
pub use errors::ExpectedError;
pub use output::{Color, OutputContext, OutputOpts};
