// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optimistic transactions.
//!
//! Each attempt records the version of every document it reads and buffers
//! its writes. Commit re-checks those versions under the store's write lock:
//! if any changed, the attempt is discarded and retried with a fresh
//! [`Transaction`], up to [`TransactionOptions::max_attempts`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

use crate::db::document::{to_document_data, Write, WriteOp};
use crate::db::firestore::Firestore;
use crate::db::path::ResourcePath;
use crate::db::reference::{DocumentReference, DocumentSnapshot};
use crate::db::store::{CommitError, MISSING_VERSION};
use crate::error::{DbError, Result, TransactionError};

/// Attempts made by `run_transaction` before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(1);

/// Retry behavior of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl TransactionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of attempts, including the first. Must be at least 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(DbError::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    /// Delay before the first retry, doubled on every further retry up to `max`.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Debug, Default)]
struct AttemptState {
    read_set: HashMap<ResourcePath, u64>,
    writes: Vec<Write>,
    closed: bool,
}

/// Transactional view of the database for a single attempt.
///
/// Clones share the same attempt. Once the attempt ends every operation
/// fails with [`DbError::TransactionClosed`].
#[derive(Debug, Clone)]
pub struct Transaction {
    db: Firestore,
    attempt: u32,
    state: Arc<Mutex<AttemptState>>,
}

impl Transaction {
    fn begin(db: Firestore, attempt: u32) -> Self {
        Self {
            db,
            attempt,
            state: Arc::new(Mutex::new(AttemptState::default())),
        }
    }

    /// 1-based attempt number this transaction belongs to.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Read a document and add it to the read set.
    ///
    /// All reads must happen before the first write.
    pub async fn get(&self, doc: &DocumentReference) -> Result<DocumentSnapshot> {
        self.db.check_owner(doc)?;
        self.with_state(|state| {
            if state.closed {
                return Err(DbError::TransactionClosed);
            }
            if !state.writes.is_empty() {
                return Err(DbError::ReadAfterWrite);
            }
            Ok(())
        })?;

        let stored = self.db.store().read(doc.resource_path()).await;
        let version = stored
            .as_ref()
            .map(|d| d.version)
            .unwrap_or(MISSING_VERSION);

        self.with_state(|state| {
            if state.closed {
                return Err(DbError::TransactionClosed);
            }
            // Keep the first observed version; a re-read that sees a newer
            // one still conflicts at commit.
            state
                .read_set
                .entry(doc.resource_path().clone())
                .or_insert(version);
            Ok(())
        })?;

        Ok(DocumentSnapshot::from_stored(doc.clone(), stored))
    }

    /// Read several documents, in order.
    pub async fn get_all(&self, docs: &[DocumentReference]) -> Result<Vec<DocumentSnapshot>> {
        let mut snapshots = Vec::with_capacity(docs.len());
        for doc in docs {
            snapshots.push(self.get(doc).await?);
        }
        Ok(snapshots)
    }

    pub fn set<T: Serialize + ?Sized>(&self, doc: &DocumentReference, data: &T) -> Result<&Self> {
        let data = to_document_data(data)?;
        self.buffer(doc, WriteOp::Set(data))
    }

    pub fn set_merge<T: Serialize + ?Sized>(
        &self,
        doc: &DocumentReference,
        data: &T,
    ) -> Result<&Self> {
        let data = to_document_data(data)?;
        self.buffer(doc, WriteOp::Merge(data))
    }

    /// Buffer a field update; the commit fails with `NotFound` if the document is missing.
    pub fn update<T: Serialize + ?Sized>(
        &self,
        doc: &DocumentReference,
        fields: &T,
    ) -> Result<&Self> {
        let fields = to_document_data(fields)?;
        self.buffer(doc, WriteOp::Update(fields))
    }

    pub fn delete(&self, doc: &DocumentReference) -> Result<&Self> {
        self.buffer(doc, WriteOp::Delete)
    }

    fn buffer(&self, doc: &DocumentReference, op: WriteOp) -> Result<&Self> {
        self.db.check_owner(doc)?;
        self.with_state(|state| {
            if state.closed {
                return Err(DbError::TransactionClosed);
            }
            state.writes.push(Write {
                path: doc.resource_path().clone(),
                op,
            });
            Ok(())
        })?;
        Ok(self)
    }

    /// Close the attempt and hand back what it read and wrote.
    fn finish(&self) -> (HashMap<ResourcePath, u64>, Vec<Write>) {
        self.with_state(|state| {
            state.closed = true;
            (
                std::mem::take(&mut state.read_set),
                std::mem::take(&mut state.writes),
            )
        })
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut AttemptState) -> R) -> R {
        // The lock is never held across an await or a user callback.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

/// How one attempt ended.
enum AttemptOutcome<T, E> {
    Committed(T),
    Aborted(E),
    Conflict(ResourcePath),
    Failed(DbError),
}

/// Run `update_function` until it commits, aborts, or runs out of attempts.
pub(crate) async fn run<F, Fut, T, E>(
    db: &Firestore,
    options: TransactionOptions,
    mut update_function: F,
) -> std::result::Result<T, TransactionError<E>>
where
    F: FnMut(Transaction) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let max_attempts = options.max_attempts;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            let delay = options.backoff(attempt - 1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        match run_attempt(db, attempt, &mut update_function).await {
            AttemptOutcome::Committed(value) => {
                tracing::debug!(attempt, "Transaction committed");
                return Ok(value);
            }
            AttemptOutcome::Aborted(err) => {
                tracing::debug!(attempt, "Transaction aborted by update function");
                return Err(TransactionError::Aborted(err));
            }
            AttemptOutcome::Failed(err) => {
                tracing::warn!(attempt, error = %err, "Transaction commit rejected");
                return Err(TransactionError::Commit(err));
            }
            AttemptOutcome::Conflict(path) => {
                tracing::debug!(
                    attempt,
                    max_attempts,
                    path = %path,
                    "Transaction conflict, document changed since read"
                );
            }
        }
    }

    tracing::warn!(
        attempts = max_attempts,
        "Transaction failed, conflicts on every attempt"
    );
    Err(TransactionError::Failed {
        attempts: max_attempts,
    })
}

async fn run_attempt<F, Fut, T, E>(
    db: &Firestore,
    attempt: u32,
    update_function: &mut F,
) -> AttemptOutcome<T, E>
where
    F: FnMut(Transaction) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let transaction = Transaction::begin(db.clone(), attempt);
    let result = update_function(transaction.clone()).await;
    let (read_set, writes) = transaction.finish();

    let value = match result {
        Ok(value) => value,
        Err(err) => return AttemptOutcome::Aborted(err),
    };

    match db.store().commit(&read_set, &writes).await {
        Ok(commit) => {
            tracing::debug!(
                attempt,
                version = commit.version,
                reads = read_set.len(),
                writes = commit.write_count,
                "Transaction attempt committed"
            );
            AttemptOutcome::Committed(value)
        }
        Err(CommitError::Conflict { path, .. }) => AttemptOutcome::Conflict(path),
        Err(CommitError::Rejected(err)) => AttemptOutcome::Failed(err),
    }
}
