// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static declaration surface: fixtures, cases, hooks, and the registry.
//!
//! Everything here is data. A [`Fixture`] is a named grouping of [`TestCase`]s
//! plus four ordered hook lists; a [`FixtureRegistry`] validates a set of
//! fixtures at registration time. There is no runtime discovery: what you
//! declare is exactly what runs.
//!
//! Hook lists are ordered base-to-derived. Inheriting from a base grouping is
//! spelled [`Fixture::with_base`], which appends the base group's hooks at the
//! point of the call, so declaring bases before the fixture's own hooks yields
//! the conventional ordering: setup runs base first, teardown (iterated in
//! reverse) runs derived first.

use crate::{
    errors::RegistryError,
    failure::{Failure, FailureKind},
    params::{CombinationMode, ParamSource, ParamTuple, expand_tuples},
    state::FixtureState,
};
use debug_ignore::DebugIgnore;
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::{collections::BTreeSet, fmt, fmt::Write as _, sync::Arc};

/// The result type returned by hooks and case bodies.
pub type HookResult = Result<(), Failure>;

type HookFnInner = dyn Fn(&mut HookContext<'_>) -> HookResult + Send + Sync;
type CaseFnInner = dyn Fn(&mut CaseContext<'_>) -> HookResult + Send + Sync;

/// A named lifecycle callback.
#[derive(Clone, Debug)]
pub struct Hook {
    name: SmolStr,
    imp: DebugIgnore<Arc<HookFnInner>>,
}

impl Hook {
    /// Creates a new hook. The name appears in failure messages.
    pub fn new(
        name: impl AsRef<str>,
        imp: impl Fn(&mut HookContext<'_>) -> HookResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: SmolStr::new(name.as_ref()),
            imp: DebugIgnore(Arc::new(imp)),
        }
    }

    /// The hook's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn call(&self, cx: &mut HookContext<'_>) -> HookResult {
        (self.imp)(cx)
    }
}

/// Context passed to lifecycle hooks.
pub struct HookContext<'a> {
    fixture_name: &'a str,
    state: &'a mut FixtureState,
    output: &'a mut String,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        fixture_name: &'a str,
        state: &'a mut FixtureState,
        output: &'a mut String,
    ) -> Self {
        Self {
            fixture_name,
            state,
            output,
        }
    }

    /// The name of the fixture this hook belongs to.
    pub fn fixture_name(&self) -> &str {
        self.fixture_name
    }

    /// The fixture instance state.
    pub fn state(&self) -> &FixtureState {
        self.state
    }

    /// The fixture instance state, mutably.
    pub fn state_mut(&mut self) -> &mut FixtureState {
        self.state
    }

    /// Appends a line of diagnostic text to the captured output.
    pub fn record(&mut self, line: impl fmt::Display) {
        let _ = writeln!(self.output, "{line}");
    }
}

/// Context passed to case bodies.
pub struct CaseContext<'a> {
    fixture_name: &'a str,
    case_name: &'a str,
    params: &'a ParamTuple,
    repeat_index: usize,
    repeat_total: usize,
    state: &'a mut FixtureState,
    output: &'a mut String,
}

impl<'a> CaseContext<'a> {
    pub(crate) fn new(
        fixture_name: &'a str,
        case_name: &'a str,
        params: &'a ParamTuple,
        repeat_index: usize,
        repeat_total: usize,
        state: &'a mut FixtureState,
        output: &'a mut String,
    ) -> Self {
        Self {
            fixture_name,
            case_name,
            params,
            repeat_index,
            repeat_total,
            state,
            output,
        }
    }

    /// The name of the enclosing fixture.
    pub fn fixture_name(&self) -> &str {
        self.fixture_name
    }

    /// The case name.
    pub fn case_name(&self) -> &str {
        self.case_name
    }

    /// The parameter tuple for this invocation. Empty for unparameterized
    /// cases.
    pub fn params(&self) -> &'a ParamTuple {
        self.params
    }

    /// The parameter value at the given source position.
    pub fn param(&self, index: usize) -> Option<&'a crate::params::ParamValue> {
        self.params.get(index)
    }

    /// Zero-based repeat iteration of this invocation.
    pub fn repeat_index(&self) -> usize {
        self.repeat_index
    }

    /// The declared repeat count of the case.
    pub fn repeat_total(&self) -> usize {
        self.repeat_total
    }

    /// The fixture instance state.
    pub fn state(&self) -> &FixtureState {
        self.state
    }

    /// The fixture instance state, mutably.
    pub fn state_mut(&mut self) -> &mut FixtureState {
        self.state
    }

    /// Appends a line of diagnostic text to the captured output.
    pub fn record(&mut self, line: impl fmt::Display) {
        let _ = writeln!(self.output, "{line}");
    }
}

/// An expected-failure directive on a case.
#[derive(Clone, Debug)]
pub struct ExpectedFailure {
    kind: Option<FailureKind>,
}

impl ExpectedFailure {
    /// Expects a failure of any kind.
    pub fn any() -> Self {
        Self { kind: None }
    }

    /// Expects a failure of the given kind or a specialization of it.
    pub fn of_kind(kind: impl Into<FailureKind>) -> Self {
        Self {
            kind: Some(kind.into()),
        }
    }

    /// The declared kind, if any.
    pub fn kind(&self) -> Option<&FailureKind> {
        self.kind.as_ref()
    }

    /// Returns true if a raised failure of `raised` kind satisfies this
    /// directive.
    pub fn matches(&self, raised: &FailureKind) -> bool {
        match &self.kind {
            None => true,
            Some(declared) => raised.is_within(declared),
        }
    }
}

/// A named unit of verification within a fixture.
#[derive(Clone, Debug)]
pub struct TestCase {
    name: SmolStr,
    tags: BTreeSet<SmolStr>,
    sources: Vec<ParamSource>,
    mode: CombinationMode,
    repeat: usize,
    skip_reason: Option<String>,
    explicit: bool,
    expected_failure: Option<ExpectedFailure>,
    body: DebugIgnore<Arc<CaseFnInner>>,
}

impl TestCase {
    /// Creates a new case with the given body.
    pub fn new(
        name: impl AsRef<str>,
        body: impl Fn(&mut CaseContext<'_>) -> HookResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: SmolStr::new(name.as_ref()),
            tags: BTreeSet::new(),
            sources: Vec::new(),
            mode: CombinationMode::default(),
            repeat: 1,
            skip_reason: None,
            explicit: false,
            expected_failure: None,
            body: DebugIgnore(Arc::new(body)),
        }
    }

    /// Adds a category tag.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(SmolStr::new(tag.as_ref()));
        self
    }

    /// Adds a parameter source. Declaration order is tuple order.
    pub fn with_source(mut self, source: ParamSource) -> Self {
        self.sources.push(source);
        self
    }

    /// Combines parameter sources positionally instead of combinatorially.
    pub fn sequential(mut self) -> Self {
        self.mode = CombinationMode::Sequential;
        self
    }

    /// Sets the repeat count. Zero is rejected at registration.
    pub fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    /// Marks the case as skipped with the given reason.
    pub fn with_skip(mut self, reason: impl Into<String>) -> Self {
        self.skip_reason = Some(reason.into());
        self
    }

    /// Excludes the case from default runs; it only runs when deliberately
    /// selected.
    pub fn explicit_only(mut self) -> Self {
        self.explicit = true;
        self
    }

    /// Declares that the case body is expected to raise a failure.
    pub fn with_expected_failure(mut self, expected: ExpectedFailure) -> Self {
        self.expected_failure = Some(expected);
        self
    }

    /// The case name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category tags declared on the case.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(SmolStr::as_str)
    }

    /// Returns true if the case carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The declared parameter sources.
    pub fn sources(&self) -> &[ParamSource] {
        &self.sources
    }

    /// How the parameter sources are combined.
    pub fn mode(&self) -> CombinationMode {
        self.mode
    }

    /// The declared repeat count.
    pub fn repeat(&self) -> usize {
        self.repeat
    }

    /// The skip reason, if the case carries a skip directive.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }

    /// Returns true if the case is excluded from default runs.
    pub fn is_explicit_only(&self) -> bool {
        self.explicit
    }

    /// The expected-failure directive, if any.
    pub fn expected_failure(&self) -> Option<&ExpectedFailure> {
        self.expected_failure.as_ref()
    }

    /// Expands the parameter sources into concrete tuples.
    pub fn expand(&self) -> Vec<ParamTuple> {
        expand_tuples(&self.sources, self.mode)
    }

    pub(crate) fn call(&self, cx: &mut CaseContext<'_>) -> HookResult {
        (self.body)(cx)
    }
}

/// A reusable grouping of hooks that fixtures can inherit from.
///
/// Each hook kind is zero or one per group; layering multiple groups (and the
/// fixture's own hooks) builds the explicit base-to-derived lists.
#[derive(Clone, Debug, Default)]
pub struct HookGroup {
    fixture_setup: Option<Hook>,
    fixture_teardown: Option<Hook>,
    case_setup: Option<Hook>,
    case_teardown: Option<Hook>,
}

impl HookGroup {
    /// Creates an empty hook group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixture-setup hook.
    pub fn with_fixture_setup(mut self, hook: Hook) -> Self {
        self.fixture_setup = Some(hook);
        self
    }

    /// Sets the fixture-teardown hook.
    pub fn with_fixture_teardown(mut self, hook: Hook) -> Self {
        self.fixture_teardown = Some(hook);
        self
    }

    /// Sets the per-case setup hook.
    pub fn with_case_setup(mut self, hook: Hook) -> Self {
        self.case_setup = Some(hook);
        self
    }

    /// Sets the per-case teardown hook.
    pub fn with_case_teardown(mut self, hook: Hook) -> Self {
        self.case_teardown = Some(hook);
        self
    }
}

/// A named grouping of test cases sharing lifecycle hooks.
#[derive(Clone, Debug)]
pub struct Fixture {
    name: SmolStr,
    tags: BTreeSet<SmolStr>,
    fixture_setup: Vec<Hook>,
    fixture_teardown: Vec<Hook>,
    case_setup: Vec<Hook>,
    case_teardown: Vec<Hook>,
    cases: Vec<TestCase>,
}

impl Fixture {
    /// Creates a new, empty fixture.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: SmolStr::new(name.as_ref()),
            tags: BTreeSet::new(),
            fixture_setup: Vec::new(),
            fixture_teardown: Vec::new(),
            case_setup: Vec::new(),
            case_teardown: Vec::new(),
            cases: Vec::new(),
        }
    }

    /// Adds a category tag.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(SmolStr::new(tag.as_ref()));
        self
    }

    /// Appends a base group's hooks to this fixture's hook lists.
    ///
    /// Call before adding the fixture's own hooks so that base hooks come
    /// first in each list.
    pub fn with_base(mut self, base: &HookGroup) -> Self {
        if let Some(hook) = &base.fixture_setup {
            self.fixture_setup.push(hook.clone());
        }
        if let Some(hook) = &base.fixture_teardown {
            self.fixture_teardown.push(hook.clone());
        }
        if let Some(hook) = &base.case_setup {
            self.case_setup.push(hook.clone());
        }
        if let Some(hook) = &base.case_teardown {
            self.case_teardown.push(hook.clone());
        }
        self
    }

    /// Appends a fixture-setup hook.
    pub fn with_fixture_setup(mut self, hook: Hook) -> Self {
        self.fixture_setup.push(hook);
        self
    }

    /// Appends a fixture-teardown hook.
    pub fn with_fixture_teardown(mut self, hook: Hook) -> Self {
        self.fixture_teardown.push(hook);
        self
    }

    /// Appends a per-case setup hook.
    pub fn with_case_setup(mut self, hook: Hook) -> Self {
        self.case_setup.push(hook);
        self
    }

    /// Appends a per-case teardown hook.
    pub fn with_case_teardown(mut self, hook: Hook) -> Self {
        self.case_teardown.push(hook);
        self
    }

    /// Adds a case. Declaration order is execution order.
    pub fn with_case(mut self, case: TestCase) -> Self {
        self.cases.push(case);
        self
    }

    /// The fixture name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Category tags declared on the fixture.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(SmolStr::as_str)
    }

    /// Returns true if the fixture carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The cases, in declaration order.
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Fixture-setup hooks, base-to-derived. Run first-to-last.
    pub fn fixture_setup_hooks(&self) -> &[Hook] {
        &self.fixture_setup
    }

    /// Fixture-teardown hooks, base-to-derived. Run last-to-first.
    pub fn fixture_teardown_hooks(&self) -> &[Hook] {
        &self.fixture_teardown
    }

    /// Per-case setup hooks, base-to-derived. Run first-to-last.
    pub fn case_setup_hooks(&self) -> &[Hook] {
        &self.case_setup
    }

    /// Per-case teardown hooks, base-to-derived. Run last-to-first.
    pub fn case_teardown_hooks(&self) -> &[Hook] {
        &self.case_teardown
    }
}

/// A validated set of fixtures, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct FixtureRegistry {
    fixtures: IndexMap<SmolStr, Fixture>,
}

impl FixtureRegistry {
    /// Creates a registry from the given fixtures.
    pub fn new(fixtures: impl IntoIterator<Item = Fixture>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for fixture in fixtures {
            registry.add(fixture)?;
        }
        Ok(registry)
    }

    /// Adds a fixture, validating its declarations.
    pub fn add(&mut self, fixture: Fixture) -> Result<(), RegistryError> {
        if self.fixtures.contains_key(fixture.name()) {
            return Err(RegistryError::DuplicateFixture {
                fixture: fixture.name().to_owned(),
            });
        }

        let mut seen = BTreeSet::new();
        for case in fixture.cases() {
            if !seen.insert(case.name()) {
                return Err(RegistryError::DuplicateCase {
                    fixture: fixture.name().to_owned(),
                    case: case.name().to_owned(),
                });
            }
            if case.repeat() == 0 {
                return Err(RegistryError::InvalidRepeatCount {
                    fixture: fixture.name().to_owned(),
                    case: case.name().to_owned(),
                });
            }
        }

        self.fixtures.insert(fixture.name.clone(), fixture);
        Ok(())
    }

    /// Iterates over fixtures in declaration order.
    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.values()
    }

    /// Returns the fixture with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&Fixture> {
        self.fixtures.get(name)
    }

    /// The number of registered fixtures.
    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    /// Returns true if no fixtures are registered.
    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_case(name: &str) -> TestCase {
        TestCase::new(name, |_cx| Ok(()))
    }

    #[test]
    fn base_hooks_come_first() {
        let base = HookGroup::new()
            .with_case_setup(Hook::new("base_setup", |_cx| Ok(())))
            .with_case_teardown(Hook::new("base_teardown", |_cx| Ok(())));
        let fixture = Fixture::new("derived")
            .with_base(&base)
            .with_case_setup(Hook::new("derived_setup", |_cx| Ok(())))
            .with_case_teardown(Hook::new("derived_teardown", |_cx| Ok(())));

        let setup_names: Vec<_> = fixture.case_setup_hooks().iter().map(Hook::name).collect();
        assert_eq!(setup_names, ["base_setup", "derived_setup"]);

        let teardown_names: Vec<_> = fixture
            .case_teardown_hooks()
            .iter()
            .rev()
            .map(Hook::name)
            .collect();
        assert_eq!(teardown_names, ["derived_teardown", "base_teardown"]);
    }

    #[test]
    fn registry_rejects_duplicate_fixture() {
        let mut registry = FixtureRegistry::default();
        registry.add(Fixture::new("sample")).expect("first add");
        let err = registry.add(Fixture::new("sample")).expect_err("duplicate");
        assert!(matches!(err, RegistryError::DuplicateFixture { .. }));
    }

    #[test]
    fn registry_rejects_duplicate_case() {
        let fixture = Fixture::new("sample")
            .with_case(noop_case("a"))
            .with_case(noop_case("a"));
        let err = FixtureRegistry::new([fixture]).expect_err("duplicate case");
        assert!(matches!(err, RegistryError::DuplicateCase { .. }));
    }

    #[test]
    fn registry_rejects_zero_repeat() {
        let fixture = Fixture::new("sample").with_case(noop_case("a").with_repeat(0));
        let err = FixtureRegistry::new([fixture]).expect_err("zero repeat");
        assert!(matches!(err, RegistryError::InvalidRepeatCount { .. }));
    }

    #[test]
    fn expected_failure_matching() {
        let any = ExpectedFailure::any();
        assert!(any.matches(&FailureKind::new("fault")));
        assert!(any.matches(&FailureKind::PANIC));

        let of_kind = ExpectedFailure::of_kind("fault");
        assert!(of_kind.matches(&FailureKind::new("fault")));
        assert!(of_kind.matches(&FailureKind::new("fault::cast")));
        assert!(!of_kind.matches(&FailureKind::new("assert")));
    }
}
