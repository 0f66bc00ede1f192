use std::collections::HashSet;
use std::fmt;

// tag sets are hashed by name, so a fast non-cryptographic hasher is enough
use core::hash::BuildHasherDefault;
use seahash::SeaHasher;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::query::PredicateSet;

pub type ItemId = i64;
pub type TagId = i64;

pub type TagHasher = BuildHasherDefault<SeaHasher>;

// ------------- Tag -------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    id: TagId,
    name: String,
}
impl Tag {
    pub fn new(id: TagId, name: String) -> Self {
        Self { id, name }
    }
    pub fn id(&self) -> TagId {
        self.id
    }
}
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

// ------------- TagSet -------------
/// The names of the tags currently associated with an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    names: HashSet<String, TagHasher>,
}
impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, name: String) -> bool {
        self.names.insert(name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
    /// Names in ascending order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.sorted();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}
impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for name in self.sorted() {
            write!(f, "/{}", name)?;
        }
        Ok(())
    }
}

// ------------- Item -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    id: ItemId,
    content: String,
    tags: TagSet,
}
impl Item {
    pub fn new(id: ItemId, content: String, tags: TagSet) -> Self {
        Self { id, content, tags }
    }
    pub fn id(&self) -> ItemId {
        self.id
    }
    pub fn content(&self) -> &str {
        &self.content
    }
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
    pub fn insert_tag(&mut self, name: String) -> bool {
        self.tags.insert(name)
    }
    /// Evaluates a predicate set against this item.
    ///
    /// A numeric predicate naming this item's own identity rejects it whatever
    /// its sign. Every other predicate must agree with the presence of its tag.
    /// An empty predicate set matches every item.
    pub fn satisfies(&self, predicates: &PredicateSet) -> bool {
        predicates.iter().all(|predicate| {
            if predicate.id() == Some(self.id) {
                return false;
            }
            predicate.is_include() == self.tags.contains(predicate.name())
        })
    }
}
impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{} ({} bytes)", self.id, self.tags, self.content.len())
    }
}
