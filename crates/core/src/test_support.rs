// Test doubles for the core ports

use crate::error::{AppError, Result};
use crate::port::{OrderedStore, TimeProvider};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Clock that only moves when told to
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn at_secs(secs: i64) -> Self {
        Self {
            millis: AtomicI64::new(secs * 1000),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    member: String,
    score: i64,
    seq: u64,
}

#[derive(Default)]
struct Sets {
    by_key: BTreeMap<String, Vec<Entry>>,
    next_seq: u64,
}

/// In-memory sorted sets with optional failure injection
#[derive(Default)]
pub struct MemoryOrderedStore {
    sets: Mutex<Sets>,
    failing_keys: Mutex<HashSet<String>>,
}

impl MemoryOrderedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `key` fail with `StoreUnavailable`
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn members(&self, key: &str) -> Vec<(String, i64)> {
        let sets = self.sets.lock().unwrap();
        sets.by_key
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| (e.member.clone(), e.score))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(AppError::StoreUnavailable(format!("injected failure on {key}")));
        }
        Ok(())
    }
}

fn sort(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.score.cmp(&b.score).then(a.seq.cmp(&b.seq)));
}

#[async_trait]
impl OrderedStore for MemoryOrderedStore {
    async fn insert_if_absent(&self, key: &str, member: &str, score: i64) -> Result<bool> {
        self.check(key)?;
        let mut sets = self.sets.lock().unwrap();
        let seq = sets.next_seq;
        let entries = sets.by_key.entry(key.to_string()).or_default();
        if entries.iter().any(|e| e.member == member) {
            return Ok(false);
        }
        entries.push(Entry {
            member: member.to_string(),
            score,
            seq,
        });
        sort(entries);
        sets.next_seq += 1;
        Ok(true)
    }

    async fn upsert(&self, key: &str, member: &str, score: i64) -> Result<()> {
        self.check(key)?;
        let mut sets = self.sets.lock().unwrap();
        let seq = sets.next_seq;
        let entries = sets.by_key.entry(key.to_string()).or_default();
        match entries.iter_mut().find(|e| e.member == member) {
            Some(existing) => {
                existing.score = score;
                existing.seq = seq;
            }
            None => entries.push(Entry {
                member: member.to_string(),
                score,
                seq,
            }),
        }
        sort(entries);
        sets.next_seq += 1;
        Ok(())
    }

    async fn rank_of(&self, key: &str, member: &str) -> Result<Option<u64>> {
        self.check(key)?;
        let sets = self.sets.lock().unwrap();
        Ok(sets
            .by_key
            .get(key)
            .and_then(|entries| entries.iter().position(|e| e.member == member))
            .map(|pos| pos as u64))
    }

    async fn pop_lowest(&self, key: &str, count: u64) -> Result<Vec<String>> {
        self.check(key)?;
        let mut sets = self.sets.lock().unwrap();
        let Some(entries) = sets.by_key.get_mut(key) else {
            return Ok(Vec::new());
        };
        let take = (count as usize).min(entries.len());
        let popped: Vec<String> = entries.drain(..take).map(|e| e.member).collect();
        if entries.is_empty() {
            sets.by_key.remove(key);
        }
        Ok(popped)
    }

    async fn cardinality(&self, key: &str) -> Result<u64> {
        self.check(key)?;
        let sets = self.sets.lock().unwrap();
        Ok(sets.by_key.get(key).map_or(0, |e| e.len() as u64))
    }

    fn scan_keys<'a>(&'a self, pattern: &'a str) -> BoxStream<'a, Result<String>> {
        let keys: Vec<Result<String>> = {
            let sets = self.sets.lock().unwrap();
            sets.by_key
                .keys()
                .filter(|key| glob_match(pattern.as_bytes(), key.as_bytes()))
                .cloned()
                .map(Ok)
                .collect()
        };
        stream::iter(keys).boxed()
    }
}

// `*` and `?` only; enough for the key patterns used here
fn glob_match(pattern: &[u8], text: &[u8]) -> bool {
    match (pattern.first(), text.first()) {
        (None, None) => true,
        (Some(b'*'), _) => {
            glob_match(&pattern[1..], text) || (!text.is_empty() && glob_match(pattern, &text[1..]))
        }
        (Some(b'?'), Some(_)) => glob_match(&pattern[1..], &text[1..]),
        (Some(p), Some(t)) if p == t => glob_match(&pattern[1..], &text[1..]),
        _ => false,
    }
}
