use tagdb::construct::ItemId;
use tagdb::persist::PersistenceMode;
use tagdb::query::{Predicate, PredicateSet, parse};
use tagdb::store::TagStore;

const ITEMS: [(&str, &str); 5] = [
    ("some content", "/foo/bar/baz"),
    ("more content", "/foo/bar/test"),
    ("blabla", "/baz/foo"),
    ("<encrypted content>", "/owner:mario"),
    (
        r#"{ "Id" : "1", "Content" : "Some JSON refering to an other Item" }"#,
        "/owner:mario/type:json/",
    ),
];

fn setup() -> TagStore {
    let store = TagStore::new(PersistenceMode::InMemory).unwrap();
    for (n, (content, tags)) in ITEMS.iter().enumerate() {
        let query = parse(tags).expect("query ok");
        let id = store.add_item(content, query.predicates()).expect("item added");
        assert_eq!(id, n as ItemId + 1);
    }
    store
}

fn ids(store: &TagStore, path: &str) -> Vec<ItemId> {
    store
        .get_items(&parse(path).expect("query ok"))
        .iter()
        .map(|item| item.id())
        .collect()
}

#[test]
fn queries_select_items_ordered_by_id() {
    let store = setup();
    assert_eq!(ids(&store, "/2"), vec![2]);
    assert_eq!(ids(&store, "/!2!3"), vec![1, 4, 5]);
    assert_eq!(ids(&store, "/foo"), vec![1, 2, 3]);
    assert_eq!(ids(&store, "/!foo"), vec![4, 5]);
    assert_eq!(ids(&store, "/foo/bar!baz"), vec![2]);
    assert_eq!(ids(&store, "/foo/bar!baz/rofl"), Vec::<ItemId>::new());
}

#[test]
fn target_item_must_satisfy_the_predicates() {
    let store = setup();
    assert_eq!(ids(&store, "/3/baz"), vec![3]);
    assert_eq!(ids(&store, "/3/test"), Vec::<ItemId>::new());
    assert_eq!(ids(&store, "/3!test"), vec![3]);
    assert_eq!(ids(&store, "/99"), Vec::<ItemId>::new());
}

#[test]
fn items_carry_content_and_tags() {
    let store = setup();
    let item = store.get_item(5).expect("item 5");
    assert_eq!(item.content(), ITEMS[4].0);
    assert_eq!(item.tags().sorted(), vec!["owner:mario", "type:json"]);
    assert!(store.get_item(6).is_none());
}

#[test]
fn tags_match_by_exact_name() {
    let store = setup();
    // "owner" is part of "owner:mario" but is not a tag of its own
    assert_eq!(ids(&store, "/owner"), Vec::<ItemId>::new());
    assert_eq!(ids(&store, "/ba"), Vec::<ItemId>::new());
    assert_eq!(ids(&store, "!ba/owner:mario"), vec![4, 5]);
}

#[test]
fn added_item_is_found_by_its_own_tags() {
    let store = setup();
    let query = parse("/colour:red/shape:round").expect("query ok");
    let id = store.add_item("a ball", query.predicates()).expect("item added");
    let found = store.get_items(&query);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), id);
    assert_eq!(found[0].content(), "a ball");
}

#[test]
fn excluded_tags_are_ignored_when_adding() {
    let store = setup();
    let query = parse("/fresh!stale").expect("query ok");
    let id = store.add_item("new", query.predicates()).expect("item added");
    let item = store.get_item(id).expect("item");
    assert_eq!(item.tags().sorted(), vec!["fresh"]);
}

#[test]
fn untagged_items_are_only_reachable_by_id() {
    let store = setup();
    let id = store.add_item("loose", &PredicateSet::new()).expect("item added");
    assert!(!ids(&store, "/!foo").contains(&id));
    assert_eq!(ids(&store, &format!("/{id}")), vec![id]);
    assert!(store.get_item(id).expect("item").tags().is_empty());
}

#[test]
fn tags_are_created_once() {
    let store = setup();
    let first = store.add_tag("unused").expect("tag");
    let second = store.add_tag("unused").expect("tag");
    assert_eq!(first, second);
    assert_ne!(store.add_tag("foo").expect("tag"), first);
}

#[test]
fn unknown_tags_give_an_empty_result() {
    let store = setup();
    assert!(store.get_items(&parse("/nothing/here").unwrap()).is_empty());
    assert_eq!(store.item_count(), ITEMS.len());
}

#[test]
fn own_identity_as_a_tag_never_selects_an_item() {
    let store = setup();
    let three: PredicateSet = [Predicate::include("3")].into_iter().collect();
    assert!(store.tag_item(3, &three));
    assert!(store.tag_item(1, &three));
    assert!(store.get_item(3).unwrap().tags().contains("3"));

    // included or excluded, the number rejects the item it names
    assert_eq!(ids(&store, "/foo/3"), vec![1]);
    assert_eq!(ids(&store, "/baz/3"), vec![1]);
    assert_eq!(ids(&store, "/!3"), vec![2, 4, 5]);
    // as the leading name it targets the item instead
    assert_eq!(ids(&store, "/3"), vec![3]);
    assert_eq!(ids(&store, "/3/foo"), vec![3]);
    assert_eq!(ids(&store, "/3!foo"), Vec::<ItemId>::new());
}

#[test]
fn items_describe_themselves() {
    let store = setup();
    let item = store.get_item(5).expect("item 5");
    assert_eq!(item.to_string(), format!("5/owner:mario/type:json ({} bytes)", ITEMS[4].0.len()));
    assert_eq!(store.get_item(3).unwrap().to_string(), "3/baz/foo (6 bytes)");
}
