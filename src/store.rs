//! The tag store: items, tags and the associations between them.
//!
//! Every public operation runs as one SQLite transaction. Storage failures stop
//! at this boundary: they are logged and turn into "no effect" (`None`, `false`
//! or an empty result) so that one bad request cannot take the service down.
//! Only opening the store reports an error, since nothing can be served without it.
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::construct::{Item, ItemId, TagId};
use crate::error::Result;
use crate::persist::{self, PersistenceMode, Persistor};
use crate::query::{PredicateSet, Query};

/// Outcome of a create-or-update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    Created(ItemId),
    Updated(ItemId),
    /// The query targeted an item that does not exist.
    Missing(ItemId),
    Failed,
}
impl Stored {
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Self::Created(id) | Self::Updated(id) => Some(*id),
            Self::Missing(_) | Self::Failed => None,
        }
    }
}

pub struct TagStore {
    persistor: Mutex<Persistor>,
}

impl TagStore {
    pub fn new(mode: PersistenceMode) -> Result<Self> {
        let persistor = Persistor::new(&mode)?;
        debug!(?mode, "tag store opened");
        Ok(Self {
            persistor: Mutex::new(persistor),
        })
    }

    fn run<T>(&self, operation: &str, work: impl FnOnce(&Connection) -> Result<T>) -> Option<T> {
        let attempt = || -> Result<T> {
            let mut persistor = self.persistor.lock()?;
            let transaction = persistor.transaction()?;
            let outcome = work(&*transaction)?;
            transaction.commit()?;
            Ok(outcome)
        };
        match attempt() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(operation, error = %e, "storage failure");
                None
            }
        }
    }

    /// Looks a tag up by name, creating it if needed.
    pub fn add_tag(&self, name: &str) -> Option<TagId> {
        self.run("add_tag", |c| persist::keep_tag(c, name).map(|tag| tag.id()))
    }

    /// Creates an item tagged with the included tags of `predicates`.
    pub fn add_item(&self, content: &str, predicates: &PredicateSet) -> Option<ItemId> {
        let id = self.run("add_item", |c| insert(c, content, predicates))?;
        debug!(id, tags = %predicates, "item added");
        Some(id)
    }

    /// Adds the included tags to an item and removes the excluded ones.
    /// Returns false when the item does not exist.
    pub fn tag_item(&self, id: ItemId, predicates: &PredicateSet) -> bool {
        let tagged = self.run("tag_item", |c| retag(c, id, predicates)).unwrap_or(false);
        debug!(id, tags = %predicates, tagged, "item retagged");
        tagged
    }

    /// Replaces the content of an item. Returns false when the item does not exist.
    pub fn update_content(&self, id: ItemId, content: &str) -> bool {
        self.run("update_content", |c| persist::update_content(c, id, content))
            .unwrap_or(false)
    }

    pub fn get_item(&self, id: ItemId) -> Option<Item> {
        self.run("get_item", |c| persist::fetch_item(c, id)).flatten()
    }

    /// The items matching a parsed query, ordered by identity.
    pub fn get_items(&self, query: &Query) -> Vec<Item> {
        self.get_items_by(query.predicates(), query.id())
    }

    /// Without an explicit `id` every tagged item is a candidate; items that
    /// carry no tag at all are only reachable through their identity.
    pub fn get_items_by(&self, predicates: &PredicateSet, id: Option<ItemId>) -> Vec<Item> {
        self.run("get_items", |c| matching(c, predicates, id))
            .unwrap_or_default()
    }

    /// Deletes the items `get_items` would return, along with their associations.
    /// Returns the identities actually deleted.
    pub fn delete_items(&self, query: &Query) -> Vec<ItemId> {
        let deleted = self
            .run("delete_items", |c| {
                let mut deleted = Vec::new();
                for item in matching(c, query.predicates(), query.id())? {
                    if persist::delete_item(c, item.id())? {
                        debug!(item = %item, "item deleted");
                        deleted.push(item.id());
                    }
                }
                Ok(deleted)
            })
            .unwrap_or_default();
        debug!(query = %query, count = deleted.len(), "items deleted");
        deleted
    }

    /// Creates a new item, or retags (and replaces the content of) the item the
    /// query targets. Empty content leaves an existing item's content untouched.
    pub fn store(&self, query: &Query, content: &str) -> Stored {
        let predicates = query.predicates();
        let outcome = self.run("store", |c| match query.id() {
            Some(id) => {
                if !retag(c, id, predicates)? {
                    return Ok(Stored::Missing(id));
                }
                if !content.is_empty() {
                    persist::update_content(c, id, content)?;
                }
                Ok(Stored::Updated(id))
            }
            None => Ok(Stored::Created(insert(c, content, predicates)?)),
        });
        outcome.unwrap_or(Stored::Failed)
    }

    pub fn item_count(&self) -> usize {
        self.run("item_count", persist::count_items).unwrap_or_default()
    }
}

fn insert(c: &Connection, content: &str, predicates: &PredicateSet) -> Result<ItemId> {
    let id = persist::insert_item(c, content)?;
    for predicate in predicates.includes() {
        let tag = persist::keep_tag(c, predicate.name())?;
        persist::associate(c, id, &tag)?;
    }
    Ok(id)
}

fn retag(c: &Connection, id: ItemId, predicates: &PredicateSet) -> Result<bool> {
    if !persist::item_exists(c, id)? {
        return Ok(false);
    }
    for predicate in predicates {
        if predicate.is_include() {
            let tag = persist::keep_tag(c, predicate.name())?;
            persist::associate(c, id, &tag)?;
            debug!(id, tag = %tag, "tag attached");
        } else if let Some(tag) = persist::find_tag(c, predicate.name())? {
            persist::dissociate(c, id, &tag)?;
            debug!(id, tag = %tag, "tag detached");
        }
    }
    Ok(true)
}

fn matching(c: &Connection, predicates: &PredicateSet, id: Option<ItemId>) -> Result<Vec<Item>> {
    let candidates = match id {
        Some(id) => persist::fetch_item(c, id)?.into_iter().collect(),
        None => persist::fetch_tagged_items(c)?,
    };
    Ok(candidates
        .into_iter()
        .filter(|item| item.satisfies(predicates))
        .collect())
}
