//! Keyword-style parameter bag passed to estimator constructors and to
//! `fit` / `predict` / `score`.
//!
//! Values are loosely typed so they can come straight from a JSON config;
//! each estimator reads the keys it understands through a [`ParamReader`]
//! and rejects the rest.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DelegationError;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Floats(Vec<f64>),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
            ParamValue::Floats(_) => "list of floats",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "'{}'", v),
            ParamValue::Floats(v) => write!(f, "[{} values]", v.len()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Floats(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ParamValue::Null)
    }
}

/// Ordered mapping of parameter name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Start reading these parameters on behalf of `estimator`.
    pub fn reader<'a>(&'a self, estimator: &'a str) -> ParamReader<'a> {
        ParamReader::new(estimator, self)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Typed, consuming view over a [`Params`] bag.
///
/// Every getter marks its key as consumed; [`ParamReader::finish`] fails on
/// the first key nobody asked for. A `Null` value reads as "not given".
pub struct ParamReader<'a> {
    estimator: &'a str,
    params: &'a Params,
    consumed: BTreeSet<&'a str>,
}

impl<'a> ParamReader<'a> {
    pub fn new(estimator: &'a str, params: &'a Params) -> Self {
        Self {
            estimator,
            params,
            consumed: BTreeSet::new(),
        }
    }

    fn take(&mut self, key: &'a str) -> Option<&'a ParamValue> {
        self.consumed.insert(key);
        let params: &'a Params = self.params;
        match params.get(key) {
            None | Some(ParamValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn wrong_type(&self, key: &str, expected: &str, got: &ParamValue) -> DelegationError {
        DelegationError::invalid(
            self.estimator,
            key,
            format!("expected {}, got {} {}", expected, got.type_name(), got),
        )
    }

    pub fn f64(&mut self, key: &'a str, default: f64) -> Result<f64, DelegationError> {
        match self.take(key) {
            None => Ok(default),
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(other) => Err(self.wrong_type(key, "float", other)),
        }
    }

    /// Like [`ParamReader::f64`] but requires a strictly positive value.
    pub fn positive_f64(&mut self, key: &'a str, default: f64) -> Result<f64, DelegationError> {
        let value = self.f64(key, default)?;
        if !(value > 0.0) {
            return Err(DelegationError::invalid(
                self.estimator,
                key,
                format!("must be > 0, got {}", value),
            ));
        }
        Ok(value)
    }

    pub fn optional_usize(&mut self, key: &'a str) -> Result<Option<usize>, DelegationError> {
        match self.take(key) {
            None => Ok(None),
            Some(ParamValue::Int(v)) if *v >= 0 => Ok(Some(*v as usize)),
            Some(other) => Err(self.wrong_type(key, "non-negative int", other)),
        }
    }

    pub fn usize(&mut self, key: &'a str, default: usize) -> Result<usize, DelegationError> {
        Ok(self.optional_usize(key)?.unwrap_or(default))
    }

    /// Like [`ParamReader::usize`] for backends that take a `u32`.
    pub fn u32(&mut self, key: &'a str, default: u32) -> Result<u32, DelegationError> {
        match self.optional_usize(key)? {
            None => Ok(default),
            Some(v) => u32::try_from(v).map_err(|_| {
                DelegationError::invalid(self.estimator, key, format!("must be <= {}, got {}", u32::MAX, v))
            }),
        }
    }

    pub fn bool(&mut self, key: &'a str, default: bool) -> Result<bool, DelegationError> {
        match self.take(key) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(self.wrong_type(key, "bool", other)),
        }
    }

    /// A string parameter restricted to `choices`.
    pub fn choice(
        &mut self,
        key: &'a str,
        choices: &[&'static str],
        default: &'static str,
    ) -> Result<&'a str, DelegationError> {
        match self.take(key) {
            None => Ok(default),
            Some(ParamValue::Str(v)) => {
                if choices.contains(&v.as_str()) {
                    Ok(v.as_str())
                } else {
                    Err(DelegationError::invalid(
                        self.estimator,
                        key,
                        format!("'{}' is not one of {:?}", v, choices),
                    ))
                }
            }
            Some(other) => Err(self.wrong_type(key, "string", other)),
        }
    }

    pub fn floats(&mut self, key: &'a str) -> Result<Option<&'a [f64]>, DelegationError> {
        match self.take(key) {
            None => Ok(None),
            Some(ParamValue::Floats(v)) => Ok(Some(v.as_slice())),
            Some(other) => Err(self.wrong_type(key, "list of floats", other)),
        }
    }

    /// Fail on the first parameter that no getter consumed.
    pub fn finish(self) -> Result<(), DelegationError> {
        match self
            .params
            .keys()
            .find(|key| !self.consumed.contains(key.as_str()))
        {
            Some(key) => Err(DelegationError::UnexpectedParameter {
                estimator: self.estimator.to_string(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Reject every parameter in `params`; used where an operation accepts no
/// keyword arguments.
pub fn ensure_empty(estimator: &str, params: &Params) -> Result<(), DelegationError> {
    ParamReader::new(estimator, params).finish()
}
