//! Addresses into a JSON value tree.
//!
//! An [`Address`] is an ordered list of [`Segment`]s: object keys and array
//! indices. The same type addresses document fields (`items.0.label`) and
//! positions inside a rich-text tree (`root.children.0.children.1`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One step of an [`Address`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Key(k) => write!(f, "{}", k),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Location of one value inside a value tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(Vec<Segment>);

/// Failure to resolve or write an [`Address`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address not found: {0}")]
    NotFound(Address),

    #[error("cannot write through a non-container value at {0}")]
    NotAContainer(Address),

    #[error("cannot write at an empty address")]
    Empty,
}

impl Address {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path; purely numeric parts become indices
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self(
            path.split('.')
                .map(|part| match part.parse::<usize>() {
                    Ok(i) => Segment::Index(i),
                    Err(_) => Segment::Key(part.to_string()),
                })
                .collect(),
        )
    }

    /// A new address with `segment` appended
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn prefix(&self, len: usize) -> Address {
        Self(self.0[..len].to_vec())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get(*i),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Object(map), Segment::Index(i)) => map.get_mut(&i.to_string()),
        (Value::Array(items), Segment::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

/// Read the value at `address`
pub fn read<'a>(tree: &'a Value, address: &Address) -> Result<&'a Value, AddressError> {
    address
        .0
        .iter()
        .try_fold(tree, |current, segment| step(current, segment))
        .ok_or_else(|| AddressError::NotFound(address.clone()))
}

/// Mutable access to the value at `address`, without creating anything
pub fn read_mut<'a>(tree: &'a mut Value, address: &Address) -> Result<&'a mut Value, AddressError> {
    let mut current = tree;
    for segment in &address.0 {
        current = match step_mut(current, segment) {
            Some(next) => next,
            None => return Err(AddressError::NotFound(address.clone())),
        };
    }
    Ok(current)
}

/// Empty container suited to hold `next`
fn container_for(next: &Segment) -> Value {
    match next {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

/// Write `value` at `address`, creating missing intermediate containers.
///
/// A missing container becomes an array when the following segment is an
/// index and an object otherwise. Short arrays are padded with nulls.
/// Writing through a scalar fails without touching the tree.
pub fn write(tree: &mut Value, address: &Address, value: Value) -> Result<(), AddressError> {
    let (last, parents) = address.0.split_last().ok_or(AddressError::Empty)?;

    let mut current = tree;
    for (depth, segment) in parents.iter().enumerate() {
        let next = &address.0[depth + 1];
        current = slot(current, segment, || container_for(next))
            .ok_or_else(|| AddressError::NotAContainer(address.prefix(depth)))?;
    }

    let target = slot(current, last, || Value::Null)
        .ok_or_else(|| AddressError::NotAContainer(address.prefix(parents.len())))?;
    *target = value;
    Ok(())
}

/// Child slot of `container` at `segment`, inserted with `fill` when absent
fn slot<'a>(
    container: &'a mut Value,
    segment: &Segment,
    fill: impl FnOnce() -> Value,
) -> Option<&'a mut Value> {
    match (container, segment) {
        (Value::Object(map), Segment::Key(key)) => Some(map.entry(key.clone()).or_insert_with(fill)),
        (Value::Object(map), Segment::Index(i)) => {
            Some(map.entry(i.to_string()).or_insert_with(fill))
        }
        (Value::Array(items), Segment::Index(i)) => {
            if *i >= items.len() {
                items.resize(*i, Value::Null);
                items.push(fill());
            }
            items.get_mut(*i)
        }
        _ => None,
    }
}
