//! Tagdb – a tag-addressable item store.
//!
//! Clients store opaque content and find it again through boolean combinations
//! of tags written as a compact, path-like query rather than through keys:
//! * `/foo/bar` – items tagged both `foo` and `bar`.
//! * `/foo!baz` – items tagged `foo` but not `baz`.
//! * `/42/foo` – item 42, provided it is tagged `foo`.
//! * `/!2!3` – every tagged item except items 2 and 3.
//!
//! ## Modules
//! * [`query`] – Parsing of query paths into a [`query::Query`]: a sorted,
//!   duplicate‑free [`query::PredicateSet`] plus an optional target item.
//! * [`construct`] – Items, tags and tag sets, and the evaluation of a predicate
//!   set against an item.
//! * [`persist`] – SQLite schema and statements backing the store.
//! * [`store`] – The [`store::TagStore`], owning the items, the tags and the
//!   many‑to‑many associations between them.
//! * [`config`] – Layered settings (defaults, `tagdb.toml`, `TAGDB_*` variables).
//! * [`server`] – The HTTP surface: GET retrieves, POST creates or updates,
//!   DELETE removes; the request path is the query.
//!
//! ## Quick Start
//! ```
//! use tagdb::persist::PersistenceMode;
//! use tagdb::query::parse;
//! use tagdb::store::TagStore;
//! let store = TagStore::new(PersistenceMode::InMemory).unwrap();
//! let tags = parse("/owner:mario/type:json").unwrap();
//! let id = store.add_item("{}", tags.predicates()).unwrap();
//! let found = store.get_items(&parse("/type:json").unwrap());
//! assert_eq!(found[0].id(), id);
//! ```
//!
//! ## Matching
//! Tags are matched by exact name. An item with no tag at all is invisible to
//! queries without a target item, but can still be reached through its identity.

pub mod config;
pub mod construct;
pub mod error;
pub mod persist;
pub mod query;
pub mod server;
pub mod store;

pub use error::{Result, TagdbError};
