//! Single-file JSON record store.
//!
//! All records live in one `records.json` document under the data
//! directory. Every operation is a read-modify-write of the whole file,
//! which is fine at classroom scale and keeps the on-disk format
//! trivially inspectable. An async mutex serializes writers within the
//! process; the dispatch task and the CLI never race on the document.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use invigil_core::error::StoreError;
use invigil_core::model::{ManualGrade, QuizResult, Student};
use invigil_core::traits::ResultStore;

const RECORDS_FILE: &str = "records.json";

/// On-disk shape of the record store.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordsDocument {
    #[serde(default)]
    results: Vec<QuizResult>,
    #[serde(default)]
    manual_grades: Vec<ManualGrade>,
    #[serde(default)]
    students: Vec<Student>,
}

/// A [`ResultStore`] backed by a single pretty-printed JSON file.
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonStore {
    /// Open a store rooted at `data_dir`.
    ///
    /// The directory and document are created lazily on the first write;
    /// reading an absent document yields empty record lists.
    pub fn open(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(RECORDS_FILE),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_document(&self) -> Result<RecordsDocument, StoreError> {
        if !self.path.exists() {
            return Ok(RecordsDocument::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_document(&self, doc: &RecordsDocument) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)?;
        Ok(())
    }

    async fn mutate<F>(&self, op: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut RecordsDocument) -> Result<(), StoreError>,
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load_document()?;
        op(&mut doc)?;
        self.save_document(&doc)
    }

    async fn snapshot(&self) -> Result<RecordsDocument, StoreError> {
        let _guard = self.lock.lock().await;
        self.load_document()
    }
}

#[async_trait]
impl ResultStore for JsonStore {
    async fn append_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        let result = result.clone();
        let id = result.id;
        self.mutate(move |doc| {
            doc.results.push(result);
            Ok(())
        })
        .await?;
        debug!(%id, "appended quiz result");
        Ok(())
    }

    async fn update_result(&self, result: &QuizResult) -> Result<(), StoreError> {
        let result = result.clone();
        let id = result.id;
        self.mutate(move |doc| {
            let slot = doc
                .results
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            *slot = result;
            Ok(())
        })
        .await?;
        debug!(%id, "updated quiz result");
        Ok(())
    }

    async fn delete_result(&self, id: Uuid) -> Result<(), StoreError> {
        self.mutate(move |doc| {
            let index = doc
                .results
                .iter()
                .position(|r| r.id == id)
                .ok_or(StoreError::NotFound(id))?;
            doc.results.remove(index);
            Ok(())
        })
        .await?;
        debug!(%id, "deleted quiz result");
        Ok(())
    }

    async fn fetch_result(&self, id: Uuid) -> Result<QuizResult, StoreError> {
        let doc = self.snapshot().await?;
        doc.results
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_results(&self) -> Result<Vec<QuizResult>, StoreError> {
        Ok(self.snapshot().await?.results)
    }

    async fn append_manual_grade(&self, grade: &ManualGrade) -> Result<(), StoreError> {
        let grade = grade.clone();
        self.mutate(move |doc| {
            doc.manual_grades.push(grade);
            Ok(())
        })
        .await
    }

    async fn list_manual_grades(&self) -> Result<Vec<ManualGrade>, StoreError> {
        Ok(self.snapshot().await?.manual_grades)
    }

    async fn upsert_student(&self, student: &Student) -> Result<(), StoreError> {
        let student = student.clone();
        self.mutate(move |doc| {
            match doc.students.iter_mut().find(|s| s.nis == student.nis) {
                Some(slot) => *slot = student,
                None => doc.students.push(student),
            }
            Ok(())
        })
        .await
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.snapshot().await?.students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use invigil_core::model::SessionAnswer;
    use tempfile::tempdir;

    fn sample_result(quiz_title: &str) -> QuizResult {
        QuizResult {
            id: Uuid::new_v4(),
            student_name: "Siti Rahma".into(),
            student_nis: "2024-041".into(),
            module_title: "Mathematics 8A".into(),
            quiz_title: quiz_title.into(),
            score: 75,
            submitted_at: Utc::now(),
            answers: vec![SessionAnswer {
                question_id: "q1".into(),
                answer: "12".into(),
                score: 10,
                max_score: 10,
            }],
            violations: 1,
            is_disqualified: false,
        }
    }

    fn sample_grade() -> ManualGrade {
        ManualGrade {
            id: Uuid::new_v4(),
            student_nis: "2024-041".into(),
            module_id: "math-8a".into(),
            title: "Essay review, week 3".into(),
            score: 85,
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
        }
    }

    #[tokio::test]
    async fn starts_empty_when_no_document_exists() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path());
        assert!(store.list_results().await.unwrap().is_empty());
        assert!(store.list_manual_grades().await.unwrap().is_empty());
        assert!(store.list_students().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn records_survive_a_reopen() {
        let dir = tempdir().unwrap();
        let result = sample_result("Fractions");
        {
            let store = JsonStore::open(dir.path());
            store.append_result(&result).await.unwrap();
            store.append_manual_grade(&sample_grade()).await.unwrap();
            store
                .upsert_student(&Student {
                    nis: "2024-041".into(),
                    name: "Siti Rahma".into(),
                    classes: vec!["8A".into()],
                })
                .await
                .unwrap();
        }

        let store = JsonStore::open(dir.path());
        let results = store.list_results().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, result.id);
        assert_eq!(results[0].answers, result.answers);
        assert_eq!(store.list_manual_grades().await.unwrap().len(), 1);
        assert_eq!(store.list_students().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_address_records_by_id() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path());
        let mut result = sample_result("Fractions");
        let other = sample_result("Algebra");
        store.append_result(&result).await.unwrap();
        store.append_result(&other).await.unwrap();

        result.score = 100;
        store.update_result(&result).await.unwrap();
        assert_eq!(store.fetch_result(result.id).await.unwrap().score, 100);

        store.delete_result(result.id).await.unwrap();
        let remaining = store.list_results().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);

        let err = store.fetch_result(result.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == result.id));
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_as_encoding_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(RECORDS_FILE), "{ not json").unwrap();

        let store = JsonStore::open(dir.path());
        let err = store.list_results().await.unwrap_err();
        assert!(matches!(err, StoreError::Encoding(_)));
    }

    #[tokio::test]
    async fn document_keeps_stable_camel_case_keys() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path());
        store.append_result(&sample_result("Fractions")).await.unwrap();
        store.append_manual_grade(&sample_grade()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"manualGrades\""));
        assert!(raw.contains("\"studentNis\""));
        assert!(raw.contains("\"isDisqualified\""));
        assert!(raw.contains('\n'), "document should be pretty-printed");
    }
}
