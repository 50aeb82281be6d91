//! In-memory store
//!
//! Strings and sets live in ordinary maps behind one lock. Batches are staged
//! on a copy of the data and swapped in only if every op succeeds, so a failed
//! batch leaves nothing behind. Set scans walk members in sorted order; a cursor
//! names the last member returned, so members removed mid-scan never shift
//! the ones still ahead.

use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use super::{KvStore, ScanPage, StoreBatch, StoreError, StoreOp, StoreResult, glob_match};

#[derive(Debug, Clone, Default)]
struct Data {
    strings: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
}

impl Data {
    fn ensure_not_set(&self, key: &str) -> StoreResult<()> {
        if self.sets.contains_key(key) {
            return Err(wrong_type(key));
        }
        Ok(())
    }

    fn ensure_not_string(&self, key: &str) -> StoreResult<()> {
        if self.strings.contains_key(key) {
            return Err(wrong_type(key));
        }
        Ok(())
    }

    fn apply(&mut self, op: StoreOp) -> StoreResult<u64> {
        match op {
            StoreOp::Set { key, value } => {
                self.ensure_not_set(&key)?;
                self.strings.insert(key, value);
                Ok(1)
            }
            StoreOp::SetIfAbsent { key, value } => {
                if self.strings.contains_key(&key) || self.sets.contains_key(&key) {
                    return Ok(0);
                }
                self.strings.insert(key, value);
                Ok(1)
            }
            StoreOp::SetIfPresent { key, value } => {
                if self.sets.contains_key(&key) {
                    return Ok(0);
                }
                match self.strings.get_mut(&key) {
                    Some(slot) => {
                        *slot = value;
                        Ok(1)
                    }
                    None => Ok(0),
                }
            }
            StoreOp::Delete { key } => {
                let removed = self.strings.remove(&key).is_some() || self.sets.remove(&key).is_some();
                Ok(u64::from(removed))
            }
            StoreOp::SetAdd { set, member } => {
                self.ensure_not_string(&set)?;
                let added = self.sets.entry(set).or_default().insert(member);
                Ok(u64::from(added))
            }
            StoreOp::SetRemove { set, member } => {
                self.ensure_not_string(&set)?;
                let Some(members) = self.sets.get_mut(&set) else {
                    return Ok(0);
                };
                let removed = members.remove(&member);
                if members.is_empty() {
                    self.sets.remove(&set);
                }
                Ok(u64::from(removed))
            }
        }
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::Command(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {key}"
    ))
}

/// Open scan cursors: cursor id -> (set, last member returned)
#[derive(Debug, Default)]
struct Cursors {
    last_id: u64,
    resume: HashMap<u64, (String, String)>,
}

impl Cursors {
    fn open(&mut self, set: &str, last: &str) -> u64 {
        self.last_id += 1;
        self.resume
            .insert(self.last_id, (set.to_string(), last.to_string()));
        self.last_id
    }
}

/// In-process [`KvStore`]
///
/// Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Data>>,
    cursors: Arc<Mutex<Cursors>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`] until switched back
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Data>> {
        self.check_available()?;
        self.data
            .read()
            .map_err(|_| StoreError::Command("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Data>> {
        self.check_available()?;
        self.data
            .write()
            .map_err(|_| StoreError::Command("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let data = self.read()?;
        data.ensure_not_set(key)?;
        Ok(data.strings.get(key).cloned())
    }

    async fn multi_get(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        let data = self.read()?;
        Ok(keys.iter().map(|k| data.strings.get(k).cloned()).collect())
    }

    async fn scan_set(
        &self,
        set: &str,
        cursor: u64,
        pattern: &str,
        count: u64,
    ) -> StoreResult<ScanPage> {
        let data = self.read()?;
        data.ensure_not_string(set)?;

        let mut cursors = self
            .cursors
            .lock()
            .map_err(|_| StoreError::Command("cursor lock poisoned".to_string()))?;

        let after = match cursor {
            0 => Bound::Unbounded,
            id => match cursors.resume.remove(&id) {
                Some((owner, last)) if owner == set => Bound::Excluded(last),
                // Unknown or foreign cursor: nothing left to walk
                _ => return Ok(ScanPage::default()),
            },
        };

        let Some(members) = data.sets.get(set) else {
            return Ok(ScanPage::default());
        };

        let count = usize::try_from(count.max(1)).unwrap_or(usize::MAX);
        let mut walk = members.range::<String, _>((after, Bound::Unbounded));
        let visited: Vec<&String> = walk.by_ref().take(count).collect();

        let next = match (visited.last(), walk.next()) {
            (Some(last), Some(_)) => cursors.open(set, last),
            _ => 0,
        };
        let page = visited
            .into_iter()
            .filter(|m| glob_match(pattern, m))
            .cloned()
            .collect();

        Ok(ScanPage {
            cursor: next,
            members: page,
        })
    }

    async fn exec(&self, batch: StoreBatch) -> StoreResult<Vec<u64>> {
        let mut data = self.write()?;

        let mut staged = data.clone();
        let mut replies = Vec::with_capacity(batch.len());
        for op in batch.into_ops() {
            let reply = staged
                .apply(op)
                .map_err(|e| StoreError::Transaction(e.to_string()))?;
            replies.push(reply);
        }

        *data = staged;
        Ok(replies)
    }
}
