//! Lifecycle hooks and type-level observers
//!
//! Hooks are modelled as an ordered list of typed stages per record type,
//! invoked by the [`Dispatcher`] in a fixed sequence; there is no dynamic
//! method interception. The fixed order per mutation:
//!
//! ```text
//! before hooks ──▶ storage mutation ──▶ after hooks ──▶ (destroy only)
//!   commit-deferred stage, once per outermost commit ──▶ observers
//! ```
//!
//! A before hook that returns `Err` vetoes the operation: the mutation
//! never happens and the error surfaces as `ValidationFailed`. Observers
//! are notified after the instance hooks of the same stage, with the
//! affected record; the observer registry is owned by the caller and
//! injected, never process-global.

use crate::core::error::{ParanoidError, ParanoidResult};
use crate::core::record::Record;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The typed hook stages, in their dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    /// Before a destroy mutation (soft or hard); may veto
    BeforeDestroy,

    /// After a destroy mutation, pre-commit
    AfterDestroy,

    /// After the outermost transaction containing a destroy commits
    AfterCommitOnDestroy,

    /// Before a recovery mutation; may veto
    BeforeRecover,

    /// After a recovery mutation, pre-commit
    AfterRecover,
}

impl HookStage {
    /// Whether an `Err` from this stage vetoes the operation
    fn vetoes(&self) -> bool {
        matches!(self, HookStage::BeforeDestroy | HookStage::BeforeRecover)
    }
}

/// An instance-level hook callback
pub type HookFn = Arc<dyn Fn(&Record) -> ParanoidResult<()> + Send + Sync>;

/// A type-level observer, notified after the instance hooks of each stage
pub trait Observer: Send + Sync {
    fn notify(&self, stage: HookStage, record: &Record);
}

/// An [`Observer`] that records the last record seen per stage, for
/// inspection in tests and diagnostics
#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<HashMap<HookStage, Record>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last record observed at this stage, if any
    pub fn last(&self, stage: HookStage) -> Option<Record> {
        self.seen
            .lock()
            .ok()
            .and_then(|seen| seen.get(&stage).cloned())
    }

    /// Clear all observed state
    pub fn reset(&self) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.clear();
        }
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, stage: HookStage, record: &Record) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(stage, record.clone());
        }
    }
}

/// Routes lifecycle events to hooks and observers in the fixed order
///
/// Maps `(record_type, stage)` to the registered hooks.
#[derive(Default)]
pub struct Dispatcher {
    hooks: HashMap<(String, HookStage), Vec<HookFn>>,
    observers: HashMap<String, Vec<Arc<dyn Observer>>>,
}

impl Dispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook for a record type at a stage. Hooks run in
    /// registration order.
    pub fn on<F>(&mut self, record_type: impl Into<String>, stage: HookStage, hook: F)
    where
        F: Fn(&Record) -> ParanoidResult<()> + Send + Sync + 'static,
    {
        self.hooks
            .entry((record_type.into(), stage))
            .or_default()
            .push(Arc::new(hook));
    }

    /// Register a type-level observer
    pub fn observe(&mut self, record_type: impl Into<String>, observer: Arc<dyn Observer>) {
        self.observers
            .entry(record_type.into())
            .or_default()
            .push(observer);
    }

    /// Run the instance hooks of a stage, then notify observers.
    ///
    /// Errors from vetoing stages surface as `ValidationFailed`; errors
    /// from after-stages propagate unchanged.
    pub fn run(&self, stage: HookStage, record: &Record) -> ParanoidResult<()> {
        if let Some(hooks) = self.hooks.get(&(record.record_type.clone(), stage)) {
            for hook in hooks {
                hook(record).map_err(|e| {
                    if stage.vetoes() && !matches!(e, ParanoidError::ValidationFailed { .. }) {
                        ParanoidError::validation(e.to_string())
                    } else {
                        e
                    }
                })?;
            }
        }
        self.notify_observers(stage, record);
        Ok(())
    }

    /// Run the commit-deferred stage. Post-commit errors cannot roll
    /// anything back, so they are logged and swallowed.
    pub fn run_deferred(&self, record: &Record) {
        if let Some(hooks) = self
            .hooks
            .get(&(record.record_type.clone(), HookStage::AfterCommitOnDestroy))
        {
            for hook in hooks {
                if let Err(e) = hook(record) {
                    tracing::warn!(
                        record_type = %record.record_type,
                        id = %record.id,
                        error = %e,
                        "after-commit hook failed"
                    );
                }
            }
        }
        self.notify_observers(HookStage::AfterCommitOnDestroy, record);
    }

    /// Whether anything is registered for the commit-deferred stage
    pub fn wants_deferred(&self, record_type: &str) -> bool {
        self.hooks
            .get(&(record_type.to_string(), HookStage::AfterCommitOnDestroy))
            .is_some_and(|hooks| !hooks.is_empty())
            || self.has_observers(record_type)
    }

    fn has_observers(&self, record_type: &str) -> bool {
        self.observers
            .get(record_type)
            .is_some_and(|observers| !observers.is_empty())
    }

    fn notify_observers(&self, stage: HookStage, record: &Record) {
        if let Some(observers) = self.observers.get(&record.record_type) {
            for observer in observers {
                observer.notify(stage, record);
            }
        }
    }
}
