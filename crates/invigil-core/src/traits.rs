//! Boundary traits connecting the session engine to its hosts.
//!
//! The engine names no concrete storage: submission dispatch, the gradebook,
//! and the operator commands all go through [`ResultStore`].
//! [`SessionObserver`] is the operator-visible notification surface for
//! failures that must not interrupt the student.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{ManualGrade, QuizResult, Student};

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Persistence seam for everything the engine emits and the gradebook reads.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Appends a freshly emitted result. Exactly one call per submission.
    async fn append_result(&self, result: &QuizResult) -> Result<(), StoreError>;

    /// Overwrites the stored result carrying the same id.
    async fn update_result(&self, result: &QuizResult) -> Result<(), StoreError>;

    /// Deletes a result record (operator recovery from disqualification).
    async fn delete_result(&self, id: Uuid) -> Result<(), StoreError>;

    /// Fetches one result by id.
    async fn fetch_result(&self, id: Uuid) -> Result<QuizResult, StoreError>;

    /// All results, in insertion order.
    async fn list_results(&self) -> Result<Vec<QuizResult>, StoreError>;

    /// Appends an operator-entered grade.
    async fn append_manual_grade(&self, grade: &ManualGrade) -> Result<(), StoreError>;

    /// All manual grades, in insertion order.
    async fn list_manual_grades(&self) -> Result<Vec<ManualGrade>, StoreError>;

    /// Adds or replaces a roster entry, matched on `nis`.
    async fn upsert_student(&self, student: &Student) -> Result<(), StoreError>;

    /// The roster, in insertion order.
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;
}

// ---------------------------------------------------------------------------
// Operator notifications
// ---------------------------------------------------------------------------

/// Receives conditions an operator should know about.
pub trait SessionObserver: Send + Sync {
    /// A submitted record could not be persisted. The submission itself
    /// stands; there is no retry and no rollback.
    fn on_dispatch_failure(&self, result: &QuizResult, error: &StoreError);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_dispatch_failure(&self, _: &QuizResult, _: &StoreError) {}
}

/// Persists an emitted record without blocking the session host.
///
/// At-most-once: the session is already terminal when this runs, and a
/// failure is logged and handed to the observer, nothing more.
pub fn dispatch_result(
    store: Arc<dyn ResultStore>,
    observer: Arc<dyn SessionObserver>,
    result: QuizResult,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(error) = store.append_result(&result).await {
            tracing::error!(result_id = %result.id, "failed to persist quiz result: {error}");
            observer.on_dispatch_failure(&result, &error);
        }
    })
}
