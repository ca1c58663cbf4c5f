// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests driving full runs over the demonstration fixtures.

mod basic;
mod fixtures;
