//! In-memory record store for tests and preview sessions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use invigil_core::error::StoreError;
use invigil_core::model::{ManualGrade, QuizResult, Student};
use invigil_core::traits::ResultStore;

/// A [`ResultStore`] that keeps every record in process memory.
///
/// Preview sessions use it so nothing lands on disk, and tests use its
/// call counters to assert how many writes a code path issued.
pub struct MemoryStore {
    results: Mutex<Vec<QuizResult>>,
    manual_grades: Mutex<Vec<ManualGrade>>,
    students: Mutex<Vec<Student>>,
    /// When set, every write fails with this rejection reason.
    reject: Option<String>,
    /// Number of `append_result` calls received, failed ones included.
    append_count: AtomicU32,
    /// Number of `update_result` calls received, failed ones included.
    update_count: AtomicU32,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            results: Mutex::new(Vec::new()),
            manual_grades: Mutex::new(Vec::new()),
            students: Mutex::new(Vec::new()),
            reject: None,
            append_count: AtomicU32::new(0),
            update_count: AtomicU32::new(0),
        }
    }

    /// Create a store pre-seeded with a student roster.
    pub fn with_students(students: Vec<Student>) -> Self {
        let store = Self::new();
        *store.students.lock().unwrap() = students;
        store
    }

    /// Create a store that rejects every write with the given reason.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            reject: Some(reason.to_string()),
            ..Self::new()
        }
    }

    /// Get the number of `append_result` calls made against this store.
    pub fn append_count(&self) -> u32 {
        self.append_count.load(Ordering::Relaxed)
    }

    /// Get the number of `update_result` calls made against this store.
    pub fn update_count(&self) -> u32 {
        self.update_count.load(Ordering::Relaxed)
    }

    fn check_reject(&self) -> Result<(), StoreError> {
        match &self.reject {
            Some(reason) => Err(StoreError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn append_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        self.append_count.fetch_add(1, Ordering::Relaxed);
        self.check_reject()?;
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn update_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        self.update_count.fetch_add(1, Ordering::Relaxed);
        self.check_reject()?;
        let mut results = self.results.lock().unwrap();
        let slot = results
            .iter_mut()
            .find(|r| r.id == result.id)
            .ok_or(StoreError::NotFound(result.id))?;
        *slot = result.clone();
        Ok(())
    }

    async fn delete_result(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_reject()?;
        let mut results = self.results.lock().unwrap();
        let index = results
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        results.remove(index);
        Ok(())
    }

    async fn fetch_result(&self, id: Uuid) -> Result<QuizResult, StoreError> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_results(&self) -> Result<Vec<QuizResult>, StoreError> {
        Ok(self.results.lock().unwrap().clone())
    }

    async fn append_manual_grade(&self, grade: &ManualGrade) -> Result<(), StoreError> {
        self.check_reject()?;
        self.manual_grades.lock().unwrap().push(grade.clone());
        Ok(())
    }

    async fn list_manual_grades(&self) -> Result<Vec<ManualGrade>, StoreError> {
        Ok(self.manual_grades.lock().unwrap().clone())
    }

    async fn upsert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.check_reject()?;
        let mut students = self.students.lock().unwrap();
        match students.iter_mut().find(|s| s.nis == student.nis) {
            Some(slot) => *slot = student.clone(),
            None => students.push(student.clone()),
        }
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.students.lock().unwrap().clone())
    }
}
