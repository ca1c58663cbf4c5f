// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// `fixrun_harness::harness!(registry_fn)` expands to a `main` function that
/// parses arguments and drives the given fixture registry.
///
/// `registry_fn` must have the type
/// `fn() -> Result<FixtureRegistry, RegistryError>`.
#[macro_export]
macro_rules! harness {
    ($registry_fn:path) => {
        fn main() -> ::std::process::ExitCode {
            $crate::run_harness($registry_fn())
        }
    };
}
