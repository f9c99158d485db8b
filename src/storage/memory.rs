//! In-memory implementation of the Store trait for testing and development
//!
//! Tables are insertion-ordered (`IndexMap`), so unfiltered reads come
//! back in creation order. Transactions snapshot the whole table set at
//! the outermost `begin`; nested `begin`s join by depth counting and a
//! rollback at any depth restores the outermost snapshot.

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::predicate::Predicate;
use crate::core::record::Record;
use crate::core::store::{CommitHook, Store};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

type Tables = HashMap<String, IndexMap<Uuid, Record>>;

#[derive(Default)]
struct Inner {
    tables: Tables,
    depth: usize,
    snapshot: Option<Tables>,
    aborted: bool,
}

/// In-memory store implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    pending: Arc<Mutex<Vec<CommitHook>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self) -> ParanoidResult<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| ParanoidError::persistence(format!("failed to acquire write lock: {}", e)))
    }

    fn read(&self) -> ParanoidResult<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| ParanoidError::persistence(format!("failed to acquire read lock: {}", e)))
    }

    fn drain_pending(&self) -> Vec<CommitHook> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> ParanoidResult<()> {
        let mut inner = self.write()?;
        if inner.depth == 0 {
            inner.snapshot = Some(inner.tables.clone());
            inner.aborted = false;
        }
        inner.depth += 1;
        Ok(())
    }

    async fn commit(&self) -> ParanoidResult<()> {
        let hooks = {
            let mut inner = self.write()?;
            if inner.depth == 0 {
                return Err(ParanoidError::persistence("commit outside of transaction"));
            }
            inner.depth -= 1;
            if inner.depth > 0 {
                return Ok(());
            }
            inner.snapshot = None;
            if inner.aborted {
                inner.aborted = false;
                drop(inner);
                self.drain_pending();
                return Err(ParanoidError::persistence(
                    "transaction aborted by inner rollback",
                ));
            }
            drop(inner);
            self.drain_pending()
        };

        // Deferred callbacks run outside the lock, after durability
        for hook in hooks {
            hook();
        }
        Ok(())
    }

    async fn rollback(&self) -> ParanoidResult<()> {
        let mut inner = self.write()?;
        if inner.depth == 0 {
            return Err(ParanoidError::persistence(
                "rollback outside of transaction",
            ));
        }
        inner.depth -= 1;
        if let Some(snapshot) = &inner.snapshot {
            inner.tables = snapshot.clone();
        }
        if inner.depth == 0 {
            inner.snapshot = None;
            inner.aborted = false;
        } else {
            inner.aborted = true;
        }
        drop(inner);
        self.drain_pending();
        Ok(())
    }

    fn defer_on_commit(&self, hook: CommitHook) {
        let in_transaction = self.inner.read().map(|i| i.depth > 0).unwrap_or(false);
        if !in_transaction {
            hook();
            return;
        }
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(hook);
        }
    }

    async fn insert(&self, record: Record) -> ParanoidResult<Record> {
        let mut inner = self.write()?;
        let table = inner.tables.entry(record.record_type.clone()).or_default();
        if table.contains_key(&record.id) {
            return Err(ParanoidError::persistence(format!(
                "{} with id '{}' already exists",
                record.record_type, record.id
            )));
        }
        table.insert(record.id, record.clone());
        Ok(record)
    }

    async fn fetch(&self, record_type: &str, id: &Uuid) -> ParanoidResult<Option<Record>> {
        let inner = self.read()?;
        Ok(inner
            .tables
            .get(record_type)
            .and_then(|table| table.get(id))
            .cloned())
    }

    async fn update(&self, record: Record) -> ParanoidResult<Record> {
        let mut inner = self.write()?;
        let table = inner
            .tables
            .get_mut(&record.record_type)
            .ok_or_else(|| ParanoidError::not_found(&record.record_type, record.id))?;
        if !table.contains_key(&record.id) {
            return Err(ParanoidError::not_found(&record.record_type, record.id));
        }
        table.insert(record.id, record.clone());
        Ok(record)
    }

    async fn remove(&self, record_type: &str, id: &Uuid) -> ParanoidResult<()> {
        let mut inner = self.write()?;
        if let Some(table) = inner.tables.get_mut(record_type) {
            table.shift_remove(id);
        }
        Ok(())
    }

    async fn select(
        &self,
        record_type: &str,
        predicate: &Predicate,
    ) -> ParanoidResult<Vec<Record>> {
        let inner = self.read()?;
        Ok(inner
            .tables
            .get(record_type)
            .map(|table| {
                table
                    .values()
                    .filter(|record| predicate.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, record_type: &str, predicate: &Predicate) -> ParanoidResult<usize> {
        let inner = self.read()?;
        Ok(inner
            .tables
            .get(record_type)
            .map(|table| {
                table
                    .values()
                    .filter(|record| predicate.matches(record))
                    .count()
            })
            .unwrap_or(0))
    }

    async fn update_where(
        &self,
        record_type: &str,
        predicate: &Predicate,
        changes: &Map<String, Value>,
    ) -> ParanoidResult<u64> {
        let mut inner = self.write()?;
        let Some(table) = inner.tables.get_mut(record_type) else {
            return Ok(0);
        };
        let mut changed = 0;
        for record in table.values_mut() {
            if predicate.matches(record) {
                for (field, value) in changes {
                    record.set(field.clone(), value.clone());
                }
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn remove_where(
        &self,
        record_type: &str,
        predicate: &Predicate,
    ) -> ParanoidResult<u64> {
        let mut inner = self.write()?;
        let Some(table) = inner.tables.get_mut(record_type) else {
            return Ok(0);
        };
        let before = table.len();
        table.retain(|_, record| !predicate.matches(record));
        Ok((before - table.len()) as u64)
    }
}
