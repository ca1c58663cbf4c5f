// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The demonstration fixture set.
//!
//! One fixture exercising every directive the runner supports, a trivial
//! second fixture, and four fixtures demonstrating lifecycle-hook failures.
//! Consumed by the fixrun-runner integration tests and by the demo binary.

use fixrun_runner::{
    errors::RegistryError,
    failure::{Failure, ensure_eq},
    fixture::{ExpectedFailure, Fixture, FixtureRegistry, Hook, HookGroup, TestCase},
    params::{ParamSource, ParamValue},
};
use std::time::Duration;

/// The generic runtime-fault kind raised by the sample cases.
pub const FAULT: &str = "fault";

/// A specialization of [`FAULT`] for bad casts.
pub const FAULT_CAST: &str = "fault::cast";

/// A specialization of [`FAULT`] for nil-value access.
pub const FAULT_NIL: &str = "fault::nil";

/// The blocking delay the waiting cases simulate long-running work with.
pub const WAIT_DELAY: Duration = Duration::from_millis(50);

/// Builds the full demonstration registry.
pub fn registry() -> Result<FixtureRegistry, RegistryError> {
    FixtureRegistry::new([
        sample_fixture(),
        second_fixture(),
        fixture_setup_fails(),
        case_setup_fails(),
        case_teardown_fails(),
        fixture_teardown_fails(),
    ])
}

/// The main sample fixture: one case per runner feature.
fn sample_fixture() -> Fixture {
    Fixture::new("sample")
        .with_tag("sample")
        .with_case(TestCase::new("success", |_cx| ensure_eq(1 + 1, 2)))
        .with_case(
            TestCase::new("mismatch", |_cx| ensure_eq(1 + 1, 3)).explicit_only(),
        )
        .with_case(
            TestCase::new("raises", |_cx| {
                Err(Failure::new(FAULT, "deliberate failure"))
            })
            .explicit_only(),
        )
        .with_case(
            TestCase::new("expected_raise", |_cx| {
                Err(Failure::new(FAULT, "deliberate failure"))
            })
            .with_expected_failure(ExpectedFailure::of_kind(FAULT)),
        )
        .with_case(
            TestCase::new("expected_raise_wrong_kind", |_cx| {
                Err(Failure::new(FAULT, "deliberate failure"))
            })
            .with_expected_failure(ExpectedFailure::of_kind(FAULT_CAST))
            .explicit_only(),
        )
        .with_case(
            TestCase::new("missing_expected_raise", |_cx| Ok(()))
                .with_expected_failure(ExpectedFailure::of_kind(FAULT))
                .explicit_only(),
        )
        .with_case(
            TestCase::new("nil_access", |_cx| {
                Err(Failure::new(FAULT_NIL, "value was nil"))
            })
            .explicit_only(),
        )
        .with_case(
            TestCase::new("wait", |cx| {
                cx.record("waiting");
                std::thread::sleep(WAIT_DELAY);
                Ok(())
            })
            .with_tag("waiting"),
        )
        .with_case(
            TestCase::new("wait_repeat", |cx| {
                cx.record("waiting");
                std::thread::sleep(WAIT_DELAY);
                Ok(())
            })
            .with_tag("waiting")
            .with_repeat(3),
        )
        .with_case(
            TestCase::new("wait_values", |cx| {
                let Some(value) = cx.param(0) else {
                    return Err(Failure::new(FAULT, "parameter missing"));
                };
                cx.record(format_args!("waiting: {value}"));
                std::thread::sleep(WAIT_DELAY);
                Ok(())
            })
            .with_tag("waiting")
            .with_source(ParamSource::new(
                "t",
                [
                    ParamValue::from(1),
                    ParamValue::from("aap"),
                    ParamValue::from(false),
                ],
            )),
        )
        .with_case(
            TestCase::new("values", |cx| {
                let Some(value) = cx.param(0) else {
                    return Err(Failure::new(FAULT, "parameter missing"));
                };
                cx.record(format_args!("value: {value}"));
                Ok(())
            })
            .with_source(ParamSource::new("s", ["one", "two", "three"])),
        )
        .with_case(
            TestCase::new("multiply_combinatorial", |cx| {
                let (Some(&ParamValue::Float(a)), Some(&ParamValue::Float(b))) =
                    (cx.param(0), cx.param(1))
                else {
                    return Err(Failure::new(FAULT, "parameters missing"));
                };
                ensure_eq(a * b, b * a)?;
                cx.record(format_args!("{a} x {b} = {}", a * b));
                Ok(())
            })
            .with_source(ParamSource::new("a", [1.0, 2.0, 3.0]))
            .with_source(ParamSource::new("b", [4.0, 5.0, 6.0])),
        )
        .with_case(
            TestCase::new("multiply_sequential", |cx| {
                let (
                    Some(&ParamValue::Float(a)),
                    Some(&ParamValue::Float(b)),
                    Some(ParamValue::Text(name)),
                ) = (cx.param(0), cx.param(1), cx.param(2))
                else {
                    return Err(Failure::new(FAULT, "parameters missing"));
                };
                ensure_eq(a * b, b * a)?;
                cx.record(format_args!("{name}: {a} x {b} = {}", a * b));
                Ok(())
            })
            .sequential()
            .with_source(ParamSource::new("a", [1.0, 2.0, 3.0]))
            .with_source(ParamSource::new("b", [4.0, 5.0, 6.0]))
            .with_source(ParamSource::new("name", ["Ann", "Bob"])),
        )
        .with_case(
            TestCase::new("ignored_case", |_cx| {
                Err(Failure::new(FAULT, "this body never runs"))
            })
            .with_skip("ignored test"),
        )
}

fn second_fixture() -> Fixture {
    Fixture::new("second").with_case(TestCase::new("also_passes", |_cx| ensure_eq(1 + 1, 2)))
}

/// A base grouping whose hooks only record that they ran.
fn logging_base() -> HookGroup {
    HookGroup::new()
        .with_fixture_setup(Hook::new("base_fixture_setup", |cx| {
            cx.record("base fixture setup");
            Ok(())
        }))
        .with_case_setup(Hook::new("base_case_setup", |cx| {
            cx.record("base case setup");
            Ok(())
        }))
}

fn fixture_setup_fails() -> Fixture {
    Fixture::new("fixture_setup_fails")
        .with_base(&logging_base())
        .with_fixture_setup(Hook::new("fixture_setup", |cx| {
            cx.record("fixture setup");
            ensure_eq(1 + 1, 3)
        }))
        .with_case(TestCase::new("first", |_cx| ensure_eq(1 + 1, 2)))
        .with_case(TestCase::new("second", |_cx| ensure_eq(1 + 1, 2)))
}

fn case_setup_fails() -> Fixture {
    Fixture::new("case_setup_fails")
        .with_base(&logging_base())
        .with_case_setup(Hook::new("case_setup", |cx| {
            cx.record("case setup");
            ensure_eq(1 + 1, 3)
        }))
        .with_case(TestCase::new("first", |_cx| ensure_eq(1 + 1, 2)))
        .with_case(TestCase::new("second", |_cx| ensure_eq(1 + 1, 2)))
}

fn case_teardown_fails() -> Fixture {
    Fixture::new("case_teardown_fails")
        .with_case_teardown(Hook::new("case_teardown", |_cx| ensure_eq(1 + 1, 3)))
        .with_case(TestCase::new("first", |_cx| ensure_eq(1 + 1, 2)))
        .with_case(TestCase::new("second", |_cx| ensure_eq(1 + 1, 2)))
}

fn fixture_teardown_fails() -> Fixture {
    Fixture::new("fixture_teardown_fails")
        .with_fixture_teardown(Hook::new("fixture_teardown", |_cx| ensure_eq(1 + 1, 3)))
        .with_case(TestCase::new("first", |_cx| ensure_eq(1 + 1, 2)))
        .with_case(TestCase::new("second", |_cx| ensure_eq(1 + 1, 2)))
}
