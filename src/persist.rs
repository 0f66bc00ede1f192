// used for persistence
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use crate::construct::{Item, ItemId, Tag, TagSet};
use crate::error::Result;

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

// ------------- Persistence -------------
pub struct Persistor {
    connection: Connection,
}
impl Persistor {
    pub fn new(mode: &PersistenceMode) -> Result<Self> {
        let connection = match mode {
            PersistenceMode::InMemory => Connection::open_in_memory()?,
            PersistenceMode::File(path) => Connection::open(path)?,
        };
        // Associations cascade away with their item (or tag), which needs
        // foreign keys enforced on every connection.
        connection.execute_batch(
            "
            pragma foreign_keys = on;
            create table if not exists Tag (
                Tag_Identity integer primary key autoincrement,
                Tag text not null,
                constraint unique_Tag unique (
                    Tag
                )
            );
            create table if not exists Item (
                Item_Identity integer primary key autoincrement,
                Content text not null
            );
            create table if not exists Item_Tag (
                Item_Identity integer not null,
                Tag_Identity integer not null,
                constraint Item_Tag_has_Item foreign key (
                    Item_Identity
                ) references Item(Item_Identity) on delete cascade,
                constraint Item_Tag_has_Tag foreign key (
                    Tag_Identity
                ) references Tag(Tag_Identity) on delete cascade,
                constraint unique_Item_Tag primary key (
                    Item_Identity,
                    Tag_Identity
                )
            );
            create index if not exists Item_Tag_by_Tag on Item_Tag (
                Tag_Identity
            );
            ",
        )?;
        Ok(Self { connection })
    }
    /// Starts the transaction that one store operation runs in.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.connection.transaction()?)
    }
}

// The statements below take a plain connection so that they can be composed
// inside a single transaction.

pub fn find_tag(connection: &Connection, name: &str) -> Result<Option<Tag>> {
    let tag = connection
        .prepare_cached(
            "
            select Tag_Identity
                from Tag
                where Tag = ?
        ",
        )?
        .query_row(params![name], |r| r.get(0))
        .optional()?;
    Ok(tag.map(|id| Tag::new(id, name.to_string())))
}

/// Looks a tag up by name, creating it on first use.
pub fn keep_tag(connection: &Connection, name: &str) -> Result<Tag> {
    connection
        .prepare_cached(
            "
            insert or ignore into Tag (
                Tag
            ) values (?)
        ",
        )?
        .execute(params![name])?;
    let id = connection
        .prepare_cached(
            "
            select Tag_Identity
                from Tag
                where Tag = ?
        ",
        )?
        .query_row(params![name], |r| r.get(0))?;
    Ok(Tag::new(id, name.to_string()))
}

pub fn insert_item(connection: &Connection, content: &str) -> Result<ItemId> {
    connection
        .prepare_cached(
            "
            insert into Item (
                Content
            ) values (?)
        ",
        )?
        .execute(params![content])?;
    Ok(connection.last_insert_rowid())
}

pub fn item_exists(connection: &Connection, item: ItemId) -> Result<bool> {
    let found = connection
        .prepare_cached(
            "
            select 1
                from Item
                where Item_Identity = ?
        ",
        )?
        .query_row(params![item], |r| r.get::<_, i64>(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn update_content(connection: &Connection, item: ItemId, content: &str) -> Result<bool> {
    let changed = connection
        .prepare_cached(
            "
            update Item
                set Content = ?
                where Item_Identity = ?
        ",
        )?
        .execute(params![content, item])?;
    Ok(changed > 0)
}

pub fn delete_item(connection: &Connection, item: ItemId) -> Result<bool> {
    let changed = connection
        .prepare_cached(
            "
            delete from Item
                where Item_Identity = ?
        ",
        )?
        .execute(params![item])?;
    Ok(changed > 0)
}

pub fn associate(connection: &Connection, item: ItemId, tag: &Tag) -> Result<()> {
    connection
        .prepare_cached(
            "
            insert or ignore into Item_Tag (
                Item_Identity,
                Tag_Identity
            ) values (?, ?)
        ",
        )?
        .execute(params![item, tag.id()])?;
    Ok(())
}

pub fn dissociate(connection: &Connection, item: ItemId, tag: &Tag) -> Result<()> {
    connection
        .prepare_cached(
            "
            delete from Item_Tag
                where Item_Identity = ?
                and Tag_Identity = ?
        ",
        )?
        .execute(params![item, tag.id()])?;
    Ok(())
}

pub fn count_items(connection: &Connection) -> Result<usize> {
    let count: i64 = connection
        .prepare_cached("select count(*) from Item")?
        .query_row([], |r| r.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// One item with all its tags; an item without tags is still found.
pub fn fetch_item(connection: &Connection, item: ItemId) -> Result<Option<Item>> {
    let mut statement = connection.prepare_cached(
        "
        select i.Content,
                t.Tag
            from Item i
            left join Item_Tag it
            on it.Item_Identity = i.Item_Identity
            left join Tag t
            on t.Tag_Identity = it.Tag_Identity
            where i.Item_Identity = ?
    ",
    )?;
    let mut rows = statement.query(params![item])?;
    let mut content = None;
    let mut tags = TagSet::new();
    while let Some(row) = rows.next()? {
        if content.is_none() {
            content = Some(row.get::<_, String>(0)?);
        }
        if let Some(tag) = row.get::<_, Option<String>>(1)? {
            tags.insert(tag);
        }
    }
    Ok(content.map(|content| Item::new(item, content, tags)))
}

/// Every item that has at least one tag, with all its tags, ordered by identity.
pub fn fetch_tagged_items(connection: &Connection) -> Result<Vec<Item>> {
    let mut statement = connection.prepare_cached(
        "
        select i.Item_Identity,
                i.Content,
                t.Tag
            from Item i
            join Item_Tag it
            on it.Item_Identity = i.Item_Identity
            join Tag t
            on t.Tag_Identity = it.Tag_Identity
            order by i.Item_Identity
    ",
    )?;
    let mut rows = statement.query([])?;
    let mut items: Vec<Item> = Vec::new();
    while let Some(row) = rows.next()? {
        let id: ItemId = row.get(0)?;
        if items.last().map(Item::id) != Some(id) {
            items.push(Item::new(id, row.get(1)?, TagSet::new()));
        }
        if let Some(item) = items.last_mut() {
            item.insert_tag(row.get(2)?);
        }
    }
    Ok(items)
}
