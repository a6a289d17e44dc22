//! Filter, sort and update evaluation for in-memory documents.
//!
//! Supports the subset of the MongoDB filter language that record mapping produces
//! plus the common hand-written operators:
//!
//! - implicit equality (`{ field: value }`), matching array fields by membership
//! - dotted paths into embedded documents
//! - `$and`, `$or`, `$nor`
//! - `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$not`
//!
//! Updates support `$set` and `$unset`.

use std::cmp::Ordering;
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use crate::error::{MemoryError, MemoryResult};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so `1i32` equals `1.0`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value (also used for missing fields)
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// ObjectId value
    ObjectId(ObjectId),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Embedded document, order-sensitive like the database
    Map(Vec<(&'a str, Comparable<'a>)>),
    /// Any other BSON value, compared by plain equality
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null | Bson::Undefined => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<Vec<_>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> Comparable<'a> {
    /// Position of the value's type in the database's cross-type sort order.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 1,
            Comparable::Number(_) => 2,
            Comparable::String(_) => 3,
            Comparable::Map(_) => 4,
            Comparable::Array(_) => 5,
            Comparable::ObjectId(_) => 7,
            Comparable::Bool(_) => 8,
            Comparable::DateTime(_) => 9,
            Comparable::Other(_) => 10,
        }
    }

    /// Total order used for sorting: values of different types order by type.
    fn sort_cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other)
            .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank()))
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            _ => None,
        }
    }
}


/// Looks up a possibly dotted path in a document.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = document;
    let mut parts = path.split('.').peekable();

    while let Some(part) = parts.next() {
        let value = current.get(part)?;

        if parts.peek().is_none() {
            return Some(value);
        }

        current = value.as_document()?;
    }

    None
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns true if the document satisfies every clause of `filter`.
    pub fn matches(&self, filter: &Document) -> MemoryResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => {
                    let mut all = true;
                    for clause in clauses(key, condition)? {
                        if !self.matches(clause)? {
                            all = false;
                            break;
                        }
                    }
                    all
                },
                "$or" => self.any(clauses(key, condition)?)?,
                "$nor" => !self.any(clauses(key, condition)?)?,
                op if op.starts_with('$') => {
                    return Err(MemoryError::UnsupportedOperator(op.to_string()));
                },
                path => self.matches_field(path, condition)?,
            };

            if !matched {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Keeps the documents matching `filter`, in their stored order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> MemoryResult<Vec<Document>> {
        let mut matched = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).matches(filter)? {
                matched.push(document.clone());
            }
        }

        Ok(matched)
    }

    fn any(&self, clauses: Vec<&Document>) -> MemoryResult<bool> {
        for clause in clauses {
            if self.matches(clause)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn matches_field(&self, path: &str, condition: &Bson) -> MemoryResult<bool> {
        let value = lookup(self.document, path);

        match condition {
            Bson::Document(ops) if is_operator_document(ops) => operators_match(value, ops),
            _ => Ok(equals(value, condition)),
        }
    }
}

fn operators_match(value: Option<&Bson>, ops: &Document) -> MemoryResult<bool> {
    for (op, operand) in ops {
        let matched = match op.as_str() {
            "$eq" => equals(value, operand),
            "$ne" => !equals(value, operand),
            "$gt" => compares(value, operand, |o| o == Ordering::Greater),
            "$gte" => compares(value, operand, |o| o != Ordering::Less),
            "$lt" => compares(value, operand, |o| o == Ordering::Less),
            "$lte" => compares(value, operand, |o| o != Ordering::Greater),
            "$in" => operand_array(op, operand)?
                .iter()
                .any(|candidate| equals(value, candidate)),
            "$nin" => !operand_array(op, operand)?
                .iter()
                .any(|candidate| equals(value, candidate)),
            "$exists" => value.is_some() == truthy(operand),
            "$not" => match operand {
                Bson::Document(inner) if is_operator_document(inner) => !operators_match(value, inner)?,
                _ => return Err(MemoryError::InvalidFilter("$not needs an operator document".into())),
            },
            other => return Err(MemoryError::UnsupportedOperator(other.to_string())),
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Equality as the database applies it: missing fields equal null, and an array field
/// matches a scalar it contains.
fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    let expected = Comparable::from(expected);

    match value {
        None => expected == Comparable::Null,
        Some(value) => {
            let actual = Comparable::from(value);

            if actual == expected {
                return true;
            }

            match actual {
                Comparable::Array(items) => items.iter().any(|item| item == &expected),
                _ => false,
            }
        },
    }
}

fn compares(value: Option<&Bson>, operand: &Bson, accept: impl Fn(Ordering) -> bool) -> bool {
    let operand = Comparable::from(operand);

    match value.map(Comparable::from) {
        Some(Comparable::Array(items)) => items
            .iter()
            .any(|item| item.partial_cmp(&operand).is_some_and(&accept)),
        Some(actual) => actual.partial_cmp(&operand).is_some_and(&accept),
        None => false,
    }
}

fn clauses<'f>(op: &str, condition: &'f Bson) -> MemoryResult<Vec<&'f Document>> {
    let items = condition
        .as_array()
        .ok_or_else(|| MemoryError::InvalidFilter(format!("{op} needs an array")))?;

    items
        .iter()
        .map(|item| {
            item.as_document()
                .ok_or_else(|| MemoryError::InvalidFilter(format!("{op} entries must be documents")))
        })
        .collect()
}

fn operand_array<'o>(op: &str, operand: &'o Bson) -> MemoryResult<&'o Vec<Bson>> {
    operand
        .as_array()
        .ok_or_else(|| MemoryError::InvalidFilter(format!("{op} needs an array")))
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        Bson::Null | Bson::Undefined => false,
        _ => true,
    }
}

pub(crate) fn is_operator_document(document: &Document) -> bool {
    document
        .keys()
        .next()
        .is_some_and(|key| key.starts_with('$'))
}


/// Sorts documents by a `{ field: 1 | -1, ... }` specification. Missing fields sort as null.
pub(crate) fn sort_documents(documents: &mut [Document], sort: &Document) -> MemoryResult<()> {
    let mut keys = Vec::with_capacity(sort.len());

    for (field, direction) in sort {
        let ascending = match direction {
            Bson::Int32(n) => *n >= 0,
            Bson::Int64(n) => *n >= 0,
            Bson::Double(n) => *n >= 0.0,
            other => {
                return Err(MemoryError::InvalidFilter(format!(
                    "sort direction for {field} must be 1 or -1, got {other}"
                )));
            },
        };
        keys.push((field.as_str(), ascending));
    }

    documents.sort_by(|a, b| {
        for (field, ascending) in &keys {
            let left = lookup(a, field)
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);
            let right = lookup(b, field)
                .map(Comparable::from)
                .unwrap_or(Comparable::Null);

            let ordering = if *ascending {
                left.sort_cmp(&right)
            } else {
                right.sort_cmp(&left)
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    });

    Ok(())
}


/// Applies an update document (`$set` / `$unset`) to a stored document.
pub(crate) fn apply_update(document: &mut Document, update: &Document) -> MemoryResult<()> {
    if update.is_empty() || !update.keys().all(|key| key.starts_with('$')) {
        return Err(MemoryError::InvalidUpdate(
            "update document must contain only update operators".into(),
        ));
    }

    for (op, fields) in update {
        let fields = fields
            .as_document()
            .ok_or_else(|| MemoryError::InvalidUpdate(format!("{op} needs a document")))?;

        match op.as_str() {
            "$set" => {
                for (path, value) in fields {
                    set_path(document, path, value.clone())?;
                }
            },
            "$unset" => {
                for (path, _) in fields {
                    unset_path(document, path);
                }
            },
            other => return Err(MemoryError::UnsupportedOperator(other.to_string())),
        }
    }

    Ok(())
}

fn set_path(document: &mut Document, path: &str, value: Bson) -> MemoryResult<()> {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
            Ok(())
        },
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }

            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(MemoryError::InvalidUpdate(format!(
                    "cannot create field {rest} inside non-document field {head}"
                ))),
            }
        },
    }
}

fn unset_path(document: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            document.remove(path);
        },
        Some((head, rest)) => {
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                unset_path(inner, rest);
            }
        },
    }
}

/// Equality clauses of a filter, used as the starting document of an upsert.
pub(crate) fn upsert_seed(filter: &Document) -> Document {
    filter
        .iter()
        .filter(|(key, _)| !key.starts_with('$') && !key.contains('.'))
        .filter_map(|(key, condition)| match condition {
            Bson::Document(ops) if is_operator_document(ops) => ops
                .get("$eq")
                .map(|value| (key.clone(), value.clone())),
            value => Some((key.clone(), value.clone())),
        })
        .collect()
}
