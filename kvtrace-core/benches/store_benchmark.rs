use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kvtrace_core::{
    CacheConfig, ExpiringFetchCache, FetchCacheConfig, KeyValueStore, MemoryStore, ObjectCache,
    Result,
};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

fn bench_memory_store_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_store");
    let store = MemoryStore::new();
    store.set("hot", b"value").unwrap();

    group.bench_function("set", |b| {
        b.iter(|| store.set(black_box("key"), black_box(b"value")).unwrap())
    });
    group.bench_function("get", |b| b.iter(|| store.get(black_box("hot")).unwrap()));
    group.bench_function("incr", |b| b.iter(|| store.incr(black_box("counter")).unwrap()));
    group.finish();
}

fn bench_lrange_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("lrange_all");

    for size in [10, 100, 1000].iter() {
        let store = MemoryStore::new();
        for i in 0..*size {
            store.rpush("log", format!("({},)", i).as_bytes()).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(store.lrange_all("log").unwrap()))
        });
    }
    group.finish();
}

fn bench_instrumented_store(c: &mut Criterion) {
    let cache = ObjectCache::new(Arc::new(MemoryStore::new()), CacheConfig::default()).unwrap();
    c.bench_function("object_cache_store", |b| {
        b.iter(|| cache.store(black_box("payload")).unwrap())
    });
}

fn bench_fetch_cache_hit(c: &mut Criterion) {
    let cache = ExpiringFetchCache::new(
        Arc::new(MemoryStore::new()),
        |url: &str| -> Result<String> { Ok(url.repeat(16)) },
        FetchCacheConfig::default(),
    );
    cache.fetch("http://bench/page").unwrap();

    c.bench_function("fetch_cache_hit", |b| {
        b.iter(|| cache.fetch(black_box("http://bench/page")).unwrap())
    });
}

fn bench_concurrent_incr(c: &mut Criterion) {
    c.bench_function("concurrent_incr_4_threads", |b| {
        b.iter(|| {
            let store = Arc::new(MemoryStore::new());
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for _ in 0..250 {
                            store.incr("shared").unwrap();
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_memory_store_primitives,
    bench_lrange_all,
    bench_instrumented_store,
    bench_fetch_cache_hit,
    bench_concurrent_incr
);
criterion_main!(benches);
