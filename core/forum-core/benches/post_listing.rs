// Post listing benchmarks
//
// Section 1: batch post creation
// Section 2: pagination per sort mode

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use forum_core::{
    ForumEngine, NewForum, NewPost, NewThread, PostQuery, SortMode, ThreadRef, UserProfile,
};

fn seeded_engine() -> (ForumEngine, ThreadRef) {
    let engine = ForumEngine::open_in_memory().unwrap();
    engine
        .create_user(
            "bench",
            UserProfile {
                email: "bench@example.org".into(),
                ..Default::default()
            },
        )
        .unwrap();
    engine
        .create_forum(NewForum {
            slug: "bench".into(),
            title: "Bench".into(),
            user: "bench".into(),
        })
        .unwrap();
    let thread = engine
        .create_thread(
            "bench",
            NewThread {
                title: "Bench".into(),
                author: "bench".into(),
                ..Default::default()
            },
        )
        .unwrap()
        .created()
        .unwrap();
    (engine, ThreadRef::Id(thread.id))
}

/// 100 roots with 20 replies each, every reply nested under the previous
/// one at depth up to 4.
fn populate(engine: &ForumEngine, thread: &ThreadRef) {
    for _ in 0..100 {
        let root = engine
            .create_posts(thread, vec![NewPost::root("bench", "root")])
            .unwrap()[0]
            .id;
        let mut parent = root;
        for i in 0..20 {
            let reply = engine
                .create_posts(thread, vec![NewPost::reply(parent, "bench", "reply")])
                .unwrap()[0]
                .id;
            parent = if i % 4 == 3 { root } else { reply };
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Section 1: Batch creation
// ═══════════════════════════════════════════════════════════════════════════

fn bench_create_posts(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_posts");
    for size in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let (engine, thread) = seeded_engine();
            b.iter(|| {
                let batch: Vec<NewPost> = (0..size)
                    .map(|_| NewPost::root("bench", "message"))
                    .collect();
                black_box(engine.create_posts(&thread, batch).unwrap());
            });
        });
    }
    group.finish();
}

// ═══════════════════════════════════════════════════════════════════════════
// Section 2: Pagination
// ═══════════════════════════════════════════════════════════════════════════

fn bench_pagination(c: &mut Criterion) {
    let (engine, thread) = seeded_engine();
    populate(&engine, &thread);

    let mut group = c.benchmark_group("posts_page");
    for sort in [SortMode::Flat, SortMode::Tree, SortMode::ParentTree] {
        for desc in [false, true] {
            let label = format!("{sort}_{}", if desc { "desc" } else { "asc" });
            let query = PostQuery::new(sort).with_limit(10).with_since(500).with_desc(desc);
            group.bench_function(label, |b| {
                b.iter(|| black_box(engine.posts(&thread, query.clone()).unwrap()));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_create_posts, bench_pagination);
criterion_main!(benches);
