//! Query paths and their parsing.
//!
//! A query path addresses items through their tags rather than through keys.
//! It is a run of operators followed by a tag name, repeated:
//!
//! * `/name` requires the tag `name` to be present,
//! * `!name` requires the tag `name` to be absent.
//!
//! When the first name of a path is an included decimal number it is not a tag
//! but the identity of a single item, so `/42/foo` targets item 42 and
//! `/foo/42` looks for items tagged both `foo` and `42`. Numeric names that
//! remain in the predicate set exclude the item with that identity, so `/!2!3`
//! matches every tagged item except 2 and 3.
//!
//! ```
//! use tagdb::query::parse;
//! let query = parse("/42/foo!bar/foo").unwrap();
//! assert_eq!(query.id(), Some(42));
//! assert_eq!(query.predicates().to_string(), "!bar/foo");
//! ```
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;
use regex::Regex;

use crate::construct::TagHasher;
use crate::error::{Result, TagdbError};

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

#[derive(Parser)]
#[grammar = "query.pest"]
struct QueryParser;

/// Recognizes a name that is an item identity: plain decimal digits that fit an `i64`.
pub fn parse_id(name: &str) -> Option<i64> {
    if DECIMAL.is_match(name) {
        name.parse().ok()
    } else {
        None
    }
}

// ------------- Predicate -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    include: bool,
    name: String,
}
impl Predicate {
    pub fn new(include: bool, name: impl Into<String>) -> Self {
        Self { include, name: name.into() }
    }
    pub fn include(name: impl Into<String>) -> Self {
        Self::new(true, name)
    }
    pub fn exclude(name: impl Into<String>) -> Self {
        Self::new(false, name)
    }
    pub fn is_include(&self) -> bool {
        self.include
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The item identity this predicate names, if its name is numeric.
    pub fn id(&self) -> Option<i64> {
        parse_id(&self.name)
    }
}
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let operator = if self.include { '/' } else { '!' };
        write!(f, "{}{}", operator, self.name)
    }
}

// ------------- PredicateSet -------------
/// Signed tag predicates with unique names, kept in ascending name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}
impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.predicates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }
    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates
            .binary_search_by(|p| p.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.predicates[i])
    }
    pub fn includes(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter().filter(|p| p.include)
    }
    pub fn excludes(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter().filter(|p| !p.include)
    }
}
// The first predicate seen for a name wins, whatever its sign.
impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        let mut seen = HashSet::<String, TagHasher>::default();
        let mut predicates: Vec<Predicate> = iter
            .into_iter()
            .filter(|p| seen.insert(p.name.clone()))
            .collect();
        predicates.sort_by(|a, b| a.name.cmp(&b.name));
        Self { predicates }
    }
}
impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;
    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}
impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for predicate in &self.predicates {
            write!(f, "{}", predicate)?;
        }
        Ok(())
    }
}

// ------------- Query -------------
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    predicates: PredicateSet,
    id: Option<i64>,
}
impl Query {
    pub fn new(predicates: PredicateSet, id: Option<i64>) -> Self {
        Self { predicates, id }
    }
    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }
    /// The explicitly targeted item, if the path started with one.
    pub fn id(&self) -> Option<i64> {
        self.id
    }
}
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = self.id {
            write!(f, "/{}", id)?;
        }
        write!(f, "{}", self.predicates)
    }
}
impl FromStr for Query {
    type Err = TagdbError;
    fn from_str(path: &str) -> Result<Self> {
        parse(path)
    }
}

/// Parses a query path into its predicate set and optional target item.
pub fn parse(path: &str) -> Result<Query> {
    let pairs = QueryParser::parse(Rule::query, path).map_err(|e| {
        let position = match e.location {
            InputLocation::Pos(p) => p,
            InputLocation::Span((start, _)) => start,
        };
        TagdbError::MalformedQuery {
            message: String::from("a query path must start with '/' or '!'"),
            position,
        }
    })?;

    // predicates in the order they were scanned, duplicates dropped
    let mut seen = HashSet::<&str, TagHasher>::default();
    let mut scanned = Vec::new();
    let mut include = true;
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::operators => include = pair.as_str().ends_with('/'),
            Rule::name => {
                let name = pair.as_str();
                if seen.insert(name) {
                    scanned.push(Predicate::new(include, name));
                }
            }
            _ => (),
        }
    }

    let first = scanned.first().ok_or_else(|| TagdbError::EmptyQuery {
        path: path.to_string(),
    })?;
    let id = if first.include { first.id() } else { None };
    let skip = usize::from(id.is_some());
    Ok(Query::new(scanned.into_iter().skip(skip).collect(), id))
}
