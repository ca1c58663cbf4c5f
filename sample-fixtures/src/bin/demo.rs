// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the demonstration fixtures through the harness.
//!
//! Try `sample-fixtures-demo list`, `sample-fixtures-demo run`, or
//! `sample-fixtures-demo run --tag waiting`.

fixrun_harness::harness!(sample_fixtures::registry);
