/// Integration tests for replaying recorded call history
use kvtrace::{instrument, replay, CacheConfig, CacheError, MemoryStore, ObjectCache, Result};
use std::sync::Arc;

#[test]
fn test_replay_with_zero_calls() {
    let store = MemoryStore::new();
    let history = replay(&store, "ObjectCache.store").unwrap();

    assert_eq!(history.count, 0);
    assert!(history.calls.is_empty());
    assert_eq!(history.lines(), vec!["ObjectCache.store was called 0 times:"]);
}

#[test]
fn test_replay_output_format() {
    let cache = ObjectCache::new(Arc::new(MemoryStore::new()), CacheConfig::default()).unwrap();
    let foo = cache.store("foo").unwrap();
    let bar = cache.store("bar").unwrap();
    let num = cache.store(42).unwrap();

    let mut out = Vec::new();
    cache.print_replay("ObjectCache.store", &mut out).unwrap();

    let expected = format!(
        "ObjectCache.store was called 3 times:\n\
         ObjectCache.store(*(\"foo\",)) -> {}\n\
         ObjectCache.store(*(\"bar\",)) -> {}\n\
         ObjectCache.store(*(42,)) -> {}\n",
        foo, bar, num
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_replay_after_failures_counts_more_than_it_lists() {
    let store = MemoryStore::new();
    let ok: Result<i32> = instrument(&store, "parse", "(\"1\",)", || Ok(1));
    let bad: Result<i32> = instrument(&store, "parse", "(\"x\",)", || {
        Err(CacheError::decode("integer", "invalid digit"))
    });
    assert!(ok.is_ok());
    assert!(bad.is_err());

    let history = replay(&store, "parse").unwrap();
    assert_eq!(history.count, 2);
    assert_eq!(
        history.lines(),
        vec![
            "parse was called 2 times:".to_string(),
            "parse(*(\"1\",)) -> 1".to_string(),
        ]
    );
}

#[test]
fn test_replay_display_matches_lines() {
    let store = MemoryStore::new();
    instrument(&store, "op", "()", || Ok("done")).unwrap();
    let history = replay(&store, "op").unwrap();
    assert_eq!(history.to_string(), history.lines().join("\n"));
}
