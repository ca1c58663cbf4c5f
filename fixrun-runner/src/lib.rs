// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [fixrun](https://crates.io/crates/fixrun-harness),
//! an in-process test-fixture runner with explicit, static registration.
//!
//! Fixtures and their cases are declared as data: builders over closures, no
//! runtime introspection. The [`list`](crate::list) module expands selected
//! cases into concrete invocations, and the [`runner`](crate::runner) module
//! executes them sequentially, enforcing lifecycle ordering and directive
//! semantics, and produces one outcome per invocation.

pub mod errors;
pub mod failure;
pub mod filter;
pub mod fixture;
mod helpers;
pub mod list;
pub mod params;
pub mod reporter;
pub mod runner;
pub mod state;
mod time;
