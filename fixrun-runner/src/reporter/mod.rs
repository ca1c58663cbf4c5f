// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumers of the runner's event stream: console display, JUnit XML, and
//! structured JSON records.

mod aggregator;
mod displayer;
pub mod events;
mod structured;

pub use aggregator::*;
pub use displayer::*;
pub use structured::*;
