use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tagdb::persist::PersistenceMode;
use tagdb::query::parse;
use tagdb::store::TagStore;

fn parsing(c: &mut Criterion) {
    c.bench_function("parse short", |b| b.iter(|| parse(black_box("/foo/bar!baz"))));
    c.bench_function("parse with duplicates", |b| {
        b.iter(|| parse(black_box("/foo/bar!baz!lol/////xd!rofl/foo!/foo/test//")))
    });
    c.bench_function("parse target", |b| {
        b.iter(|| parse(black_box("/42/foo/baz/bar/whatsup/lol!foo")))
    });
}

fn matching(c: &mut Criterion) {
    let store = TagStore::new(PersistenceMode::InMemory).unwrap();
    for n in 0..1000 {
        let path = format!("/group:{}/kind:{}/n{}", n % 10, n % 3, n);
        store.add_item("content", parse(&path).unwrap().predicates());
    }
    let broad = parse("/kind:1!group:3").unwrap();
    let targeted = parse("/500/kind:2").unwrap();
    c.bench_function("get items broad", |b| b.iter(|| store.get_items(black_box(&broad))));
    c.bench_function("get items targeted", |b| b.iter(|| store.get_items(black_box(&targeted))));
}

criterion_group!(benches, parsing, matching);
criterion_main!(benches);
