// Copyright (c) The fixrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parameter sources and their expansion into concrete tuples.

use itertools::Itertools;
use smol_str::SmolStr;
use std::fmt;

/// A literal typed parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A text value.
    Text(SmolStr),
    /// A boolean.
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(v) => write!(f, "\"{v}\""),
            ParamValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(SmolStr::new(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

/// A named, ordered sequence of candidate values for one parameter.
#[derive(Clone, Debug)]
pub struct ParamSource {
    name: SmolStr,
    values: Vec<ParamValue>,
}

impl ParamSource {
    /// Creates a new source from anything convertible to parameter values.
    pub fn new<T: Into<ParamValue>>(
        name: impl AsRef<str>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self {
            name: SmolStr::new(name.as_ref()),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The candidate values, in declaration order.
    pub fn values(&self) -> &[ParamValue] {
        &self.values
    }

    /// The number of candidate values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the source has no candidate values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// How multiple parameter sources are combined into tuples.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CombinationMode {
    /// Full Cartesian product of all sources, in source-major order.
    #[default]
    Combinatorial,

    /// Positional combination: tuple `i` takes index `i` from every source,
    /// truncated to the shortest source.
    Sequential,
}

/// One concrete tuple of parameter values for an invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamTuple(Vec<ParamValue>);

impl ParamTuple {
    /// The values in this tuple, in source order.
    pub fn values(&self) -> &[ParamValue] {
        &self.0
    }

    /// Returns the value at the given source position.
    pub fn get(&self, index: usize) -> Option<&ParamValue> {
        self.0.get(index)
    }

    /// Returns true if the tuple carries no values (unparameterized case).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Displayed values, in source order.
    pub fn display_values(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ParamTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().format(", "))
    }
}

/// Expands parameter sources into concrete tuples under the given mode.
///
/// A case with no sources expands to a single empty tuple. A combinatorial
/// case with an empty source expands to no tuples at all, and so does a
/// sequential case, since the shortest length is zero.
pub fn expand_tuples(sources: &[ParamSource], mode: CombinationMode) -> Vec<ParamTuple> {
    if sources.is_empty() {
        return vec![ParamTuple::default()];
    }

    match mode {
        CombinationMode::Combinatorial => sources
            .iter()
            .map(|source| source.values().iter().cloned())
            .multi_cartesian_product()
            .map(ParamTuple)
            .collect(),
        CombinationMode::Sequential => {
            let len = sources
                .iter()
                .map(ParamSource::len)
                .min()
                .expect("at least one source is present");
            (0..len)
                .map(|i| ParamTuple(sources.iter().map(|s| s.values()[i].clone()).collect()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doubles(name: &str, values: &[f64]) -> ParamSource {
        ParamSource::new(name, values.iter().copied())
    }

    #[test]
    fn no_sources_is_one_empty_tuple() {
        let tuples = expand_tuples(&[], CombinationMode::Combinatorial);
        assert_eq!(tuples, vec![ParamTuple::default()]);
        assert!(tuples[0].is_empty());
    }

    #[test]
    fn combinatorial_is_full_product() {
        let sources = [
            doubles("a", &[1.0, 2.0, 3.0]),
            doubles("b", &[4.0, 5.0, 6.0]),
        ];
        let tuples = expand_tuples(&sources, CombinationMode::Combinatorial);
        assert_eq!(tuples.len(), 9);
        // Source-major order: the first source varies slowest.
        assert_eq!(tuples[0].to_string(), "(1, 4)");
        assert_eq!(tuples[1].to_string(), "(1, 5)");
        assert_eq!(tuples[8].to_string(), "(3, 6)");
    }

    #[test]
    fn combinatorial_with_empty_source_is_empty() {
        let sources = [doubles("a", &[1.0, 2.0]), doubles("b", &[])];
        assert_eq!(
            expand_tuples(&sources, CombinationMode::Combinatorial),
            vec![]
        );
    }

    #[test]
    fn sequential_truncates_to_shortest() {
        let sources = [
            doubles("a", &[1.0, 2.0, 3.0]),
            doubles("b", &[4.0, 5.0, 6.0]),
            ParamSource::new("name", ["Ann", "Bob"]),
        ];
        let tuples = expand_tuples(&sources, CombinationMode::Sequential);
        assert_eq!(
            tuples.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec![r#"(1, 4, "Ann")"#, r#"(2, 5, "Bob")"#],
        );
    }

    #[test]
    fn single_source_modes_agree() {
        let sources = [ParamSource::new("s", ["one", "two", "three"])];
        let combinatorial = expand_tuples(&sources, CombinationMode::Combinatorial);
        let sequential = expand_tuples(&sources, CombinationMode::Sequential);
        assert_eq!(combinatorial, sequential);
        assert_eq!(combinatorial.len(), 3);
    }

    #[test]
    fn mixed_value_types_display() {
        let source = ParamSource::new(
            "t",
            [ParamValue::from(1), ParamValue::from("aap"), ParamValue::from(false)],
        );
        let tuples = expand_tuples(
            std::slice::from_ref(&source),
            CombinationMode::Combinatorial,
        );
        assert_eq!(
            tuples.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["(1)", r#"("aap")"#, "(false)"],
        );
    }
}
