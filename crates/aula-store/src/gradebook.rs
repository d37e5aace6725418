//! In-memory gradebook
//!
//! Holds student and grade records, answers ownership lookups for the guard
//! layer, and executes the grading operations the guard stack wraps. The
//! operations do no authorization of their own; by the time a request
//! reaches [`MemoryGradebook::execute`] the guard has already allowed it.

use async_trait::async_trait;
use aula_core::effects::{GradeStoreEffects, StoreError};
use aula_core::operation::names;
use aula_core::{
    AulaError, AulaResult, Controller, GradeId, GradeRecord, OperationDescriptor, StudentId,
    StudentRecord,
};
use aula_guards::{DispatchError, GuardedRequest, OperationHandler};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const STUDENT_NOT_FOUND: &str = "Estudiante no encontrado";
const GRADE_NOT_FOUND: &str = "Nota no encontrada";

/// Grade form as submitted by the grade editor.
#[derive(Debug, Deserialize)]
struct GradeForm {
    #[serde(default)]
    id: Option<GradeId>,
    #[serde(alias = "estudianteId")]
    student_id: StudentId,
    #[serde(alias = "materia")]
    subject: String,
    #[serde(default, alias = "observacion")]
    observation: Option<String>,
    #[serde(alias = "valor")]
    value: f64,
    #[serde(default, alias = "porcentaje")]
    percentage: f64,
}

/// Student form as submitted by the roster editor.
#[derive(Debug, Deserialize)]
struct StudentForm {
    #[serde(default)]
    id: Option<StudentId>,
    #[serde(alias = "nombre")]
    first_name: String,
    #[serde(alias = "apellido")]
    last_name: String,
    #[serde(default, alias = "correo")]
    email: Option<String>,
}

fn next_id(highest: Option<i64>) -> AulaResult<i64> {
    highest
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| AulaError::invalid("record id space exhausted"))
}

#[derive(Debug, Default)]
struct Book {
    students: BTreeMap<StudentId, StudentRecord>,
    grades: BTreeMap<GradeId, GradeRecord>,
}

impl Book {
    fn next_student_id(&self) -> AulaResult<StudentId> {
        next_id(self.students.keys().last().map(|id| id.value())).map(StudentId::new)
    }

    fn next_grade_id(&self) -> AulaResult<GradeId> {
        next_id(self.grades.keys().last().map(|id| id.value())).map(GradeId::new)
    }

    fn student(&self, id: StudentId) -> AulaResult<&StudentRecord> {
        self.students
            .get(&id)
            .ok_or_else(|| AulaError::not_found(STUDENT_NOT_FOUND))
    }

    fn grades_of(&self, student: StudentId) -> Vec<GradeRecord> {
        self.grades
            .values()
            .filter(|g| g.student_id == student)
            .cloned()
            .collect()
    }

    fn average(&self, student: StudentId, subject: &str) -> f64 {
        let values: Vec<f64> = self
            .grades
            .values()
            .filter(|g| g.student_id == student && g.subject == subject)
            .map(|g| g.value)
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }
}

/// Student and grade records in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryGradebook {
    book: Arc<RwLock<Book>>,
}

impl MemoryGradebook {
    /// Create an empty gradebook
    pub fn new() -> Self {
        Self::default()
    }

    /// Gradebook pre-populated with records
    pub fn with_records(students: Vec<StudentRecord>, grades: Vec<GradeRecord>) -> Self {
        let book = Book {
            students: students.into_iter().map(|s| (s.id, s)).collect(),
            grades: grades.into_iter().map(|g| (g.id, g)).collect(),
        };
        Self {
            book: Arc::new(RwLock::new(book)),
        }
    }

    /// Insert or replace a student
    pub async fn insert_student(&self, student: StudentRecord) {
        self.book.write().await.students.insert(student.id, student);
    }

    /// Insert or replace a grade
    pub async fn insert_grade(&self, grade: GradeRecord) {
        self.book.write().await.grades.insert(grade.id, grade);
    }

    /// Grades of one student, by grade id
    pub async fn grades_of(&self, student: StudentId) -> Vec<GradeRecord> {
        self.book.read().await.grades_of(student)
    }

    /// Arithmetic mean of a student's grades in `subject`; `0.0` without grades
    pub async fn average_for(&self, student: StudentId, subject: &str) -> f64 {
        self.book.read().await.average(student, subject)
    }

    /// Run one grading operation.
    pub async fn execute(&self, descriptor: &OperationDescriptor) -> AulaResult<Value> {
        match &descriptor.controller {
            Controller::Grades => self.grade_operation(descriptor).await,
            Controller::Students => self.student_operation(descriptor).await,
            Controller::GradeService => self.service_operation(descriptor).await,
            Controller::Other(_) => Err(unknown(descriptor)),
        }
    }

    async fn grade_operation(&self, descriptor: &OperationDescriptor) -> AulaResult<Value> {
        match descriptor.operation.as_str() {
            names::grades::LIST => {
                let student_id = student_argument(descriptor)?;
                let book = self.book.read().await;
                let student = book.student(student_id)?;
                Ok(json!({
                    "estudiante": student,
                    "notas": book.grades_of(student_id),
                }))
            }
            names::grades::SHOW_AVERAGE_FORM => {
                let student_id = student_argument(descriptor)?;
                Ok(json!({ "estudianteId": student_id, "materia": "", "promedio": null }))
            }
            names::grades::COMPUTE_AVERAGE => self.average_response(descriptor).await,
            names::grades::CREATE => {
                let student_id = student_argument(descriptor)?;
                let book = self.book.read().await;
                let student = book.student(student_id)?;
                Ok(json!({ "nota": { "student_id": student.id }, "estudiante": student }))
            }
            names::grades::SAVE => {
                let form: GradeForm = record_argument(descriptor)?;
                let mut book = self.book.write().await;
                book.student(form.student_id)?;
                let id = match form.id {
                    Some(id) => id,
                    None => book.next_grade_id()?,
                };
                let record = GradeRecord {
                    id,
                    student_id: form.student_id,
                    subject: form.subject,
                    observation: form.observation,
                    value: form.value,
                    percentage: form.percentage,
                };
                book.grades.insert(id, record.clone());
                tracing::debug!(grade = %id, student = %record.student_id, "Grade saved");
                Ok(json!({ "nota": record }))
            }
            names::grades::EDIT => {
                let id = GradeId::new(integer_argument(descriptor, "grade id")?);
                let book = self.book.read().await;
                let grade = book
                    .grades
                    .get(&id)
                    .ok_or_else(|| AulaError::not_found(GRADE_NOT_FOUND))?;
                Ok(json!({ "nota": grade }))
            }
            names::grades::DELETE => {
                let id = GradeId::new(integer_argument(descriptor, "grade id")?);
                let removed = self
                    .book
                    .write()
                    .await
                    .grades
                    .remove(&id)
                    .ok_or_else(|| AulaError::not_found(GRADE_NOT_FOUND))?;
                tracing::debug!(grade = %id, "Grade deleted");
                Ok(json!({ "eliminada": id, "estudianteId": removed.student_id }))
            }
            _ => Err(unknown(descriptor)),
        }
    }

    async fn student_operation(&self, descriptor: &OperationDescriptor) -> AulaResult<Value> {
        match descriptor.operation.as_str() {
            names::students::LIST => {
                let book = self.book.read().await;
                let students: Vec<&StudentRecord> = book.students.values().collect();
                Ok(json!({ "estudiantes": students }))
            }
            names::students::CREATE => Ok(json!({ "estudiante": {} })),
            names::students::SAVE => {
                let form: StudentForm = record_argument(descriptor)?;
                let mut book = self.book.write().await;
                let id = match form.id {
                    Some(id) => id,
                    None => book.next_student_id()?,
                };
                let record = StudentRecord {
                    id,
                    first_name: form.first_name,
                    last_name: form.last_name,
                    email: form.email,
                };
                book.students.insert(id, record.clone());
                Ok(json!({ "estudiante": record }))
            }
            names::students::EDIT => {
                let id = StudentId::new(integer_argument(descriptor, "student id")?);
                let book = self.book.read().await;
                Ok(json!({ "estudiante": book.student(id)? }))
            }
            names::students::DELETE => {
                let id = StudentId::new(integer_argument(descriptor, "student id")?);
                let mut book = self.book.write().await;
                book.students
                    .remove(&id)
                    .ok_or_else(|| AulaError::not_found(STUDENT_NOT_FOUND))?;
                book.grades.retain(|_, grade| grade.student_id != id);
                Ok(json!({ "eliminado": id }))
            }
            _ => Err(unknown(descriptor)),
        }
    }

    async fn service_operation(&self, descriptor: &OperationDescriptor) -> AulaResult<Value> {
        match descriptor.operation.as_str() {
            names::grade_service::AVERAGE_BY_SUBJECT => self.average_response(descriptor).await,
            _ => Err(unknown(descriptor)),
        }
    }

    async fn average_response(&self, descriptor: &OperationDescriptor) -> AulaResult<Value> {
        let student_id = student_argument(descriptor)?;
        let subject = descriptor
            .first_text()
            .ok_or_else(|| AulaError::invalid("subject is required"))?;
        let average = self.average_for(student_id, subject).await;
        Ok(json!({ "estudianteId": student_id, "materia": subject, "promedio": average }))
    }
}

fn integer_argument(descriptor: &OperationDescriptor, what: &str) -> AulaResult<i64> {
    descriptor
        .first_integer()
        .ok_or_else(|| AulaError::invalid(format!("{what} is required")))
}

fn student_argument(descriptor: &OperationDescriptor) -> AulaResult<StudentId> {
    integer_argument(descriptor, "student id").map(StudentId::new)
}

fn record_argument<T: serde::de::DeserializeOwned>(descriptor: &OperationDescriptor) -> AulaResult<T> {
    let record = descriptor
        .first_record()
        .ok_or_else(|| AulaError::invalid("form data is required"))?;
    Ok(serde_json::from_value(record.clone())?)
}

fn unknown(descriptor: &OperationDescriptor) -> AulaError {
    AulaError::invalid(format!("unknown operation {}", descriptor.qualified_name()))
}

#[async_trait]
impl GradeStoreEffects for MemoryGradebook {
    async fn find_grade(&self, id: GradeId) -> Result<Option<GradeRecord>, StoreError> {
        Ok(self.book.read().await.grades.get(&id).cloned())
    }
}

#[async_trait]
impl OperationHandler for MemoryGradebook {
    async fn handle(&self, request: GuardedRequest) -> Result<Value, DispatchError> {
        Ok(self.execute(&request.descriptor).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn seeded() -> MemoryGradebook {
        MemoryGradebook::with_records(
            vec![
                StudentRecord {
                    id: StudentId::new(7),
                    first_name: "Luis".into(),
                    last_name: "Pérez".into(),
                    email: None,
                },
                StudentRecord {
                    id: StudentId::new(9),
                    first_name: "Marta".into(),
                    last_name: "Gómez".into(),
                    email: Some("marta@colegio.edu".into()),
                },
            ],
            vec![
                grade(1, 7, "Historia", 4.0),
                grade(2, 7, "Historia", 3.0),
                grade(3, 7, "Física", 5.0),
                grade(15, 9, "Historia", 2.5),
            ],
        )
    }

    fn grade(id: i64, student: i64, subject: &str, value: f64) -> GradeRecord {
        GradeRecord {
            id: GradeId::new(id),
            student_id: StudentId::new(student),
            subject: subject.into(),
            observation: None,
            value,
            percentage: 25.0,
        }
    }

    fn grades(op: &str) -> OperationDescriptor {
        OperationDescriptor::new(Controller::Grades, op)
    }

    #[tokio::test]
    async fn average_is_the_mean_of_matching_grades() {
        let book = seeded();
        assert_eq!(book.average_for(StudentId::new(7), "Historia").await, 3.5);
        assert_eq!(book.average_for(StudentId::new(7), "Química").await, 0.0);

        let response = book
            .execute(
                &grades(names::grades::COMPUTE_AVERAGE)
                    .with_argument(7)
                    .with_argument("Historia"),
            )
            .await
            .unwrap();
        assert_eq!(response["promedio"], 3.5);
    }

    #[tokio::test]
    async fn listing_requires_an_existing_student() {
        let book = seeded();
        let listed = book
            .execute(&grades(names::grades::LIST).with_argument(7))
            .await
            .unwrap();
        assert_eq!(listed["notas"].as_array().map(Vec::len), Some(3));

        assert_matches!(
            book.execute(&grades(names::grades::LIST).with_argument(8)).await,
            Err(AulaError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn save_assigns_ids_and_accepts_spanish_fields() {
        let book = seeded();
        let saved = book
            .execute(&grades(names::grades::SAVE).with_argument(json!({
                "estudianteId": 9,
                "materia": "Física",
                "valor": 4.5,
                "porcentaje": 30.0
            })))
            .await
            .unwrap();
        assert_eq!(saved["nota"]["id"], 16);
        assert_eq!(
            book.find_grade(GradeId::new(16)).await.unwrap().map(|g| g.student_id),
            Some(StudentId::new(9))
        );
    }

    #[tokio::test]
    async fn exhausted_id_space_is_rejected() {
        let book = seeded();
        book.insert_grade(grade(i64::MAX, 7, "Historia", 4.0)).await;
        book.insert_student(StudentRecord {
            id: StudentId::new(i64::MAX),
            first_name: "Eva".into(),
            last_name: "Ruiz".into(),
            email: None,
        })
        .await;

        assert_matches!(
            book.execute(&grades(names::grades::SAVE).with_argument(json!({
                "student_id": 7,
                "subject": "Historia",
                "value": 4.0
            })))
            .await,
            Err(AulaError::Invalid { .. })
        );
        assert_matches!(
            book.execute(
                &OperationDescriptor::new(Controller::Students, names::students::SAVE)
                    .with_argument(json!({ "nombre": "Ana", "apellido": "Mora" }))
            )
            .await,
            Err(AulaError::Invalid { .. })
        );
    }

    #[tokio::test]
    async fn deleting_a_student_removes_their_grades() {
        let book = seeded();
        book.execute(
            &OperationDescriptor::new(Controller::Students, names::students::DELETE)
                .with_argument(9),
        )
        .await
        .unwrap();
        assert!(book.find_grade(GradeId::new(15)).await.unwrap().is_none());
        assert!(book.grades_of(StudentId::new(9)).await.is_empty());
    }

    #[tokio::test]
    async fn missing_arguments_and_unknown_operations_are_invalid() {
        let book = seeded();
        assert_matches!(
            book.execute(&grades(names::grades::EDIT)).await,
            Err(AulaError::Invalid { .. })
        );
        assert_matches!(
            book.execute(&grades("exportar")).await,
            Err(AulaError::Invalid { .. })
        );
        assert_matches!(
            book.execute(&grades(names::grades::DELETE).with_argument(404))
                .await,
            Err(AulaError::NotFound { .. })
        );
    }
}
