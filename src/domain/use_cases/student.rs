use tracing::{info, warn};

use crate::{
    constants::DEFAULT_IMAGE,
    entities::student::{Student, StudentForm},
    errors::{AppError, StorageError},
    repositories::student::StudentRepository,
    storage::FileStore,
};

/// Outcome of [`StudentHandler::upload_photo`].
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoUpload {
    /// The photo was stored and the student now points at it.
    Replaced(Student),
    /// Empty upload, nothing was written.
    Unchanged(Student),
}

/// Keeps every student's `image_path` pointing at a live file in the store
/// (or at [`DEFAULT_IMAGE`]) while students are created, edited and removed.
pub struct StudentHandler<R, F>
where
    R: StudentRepository,
    F: FileStore,
{
    pub student_repo: R,
    pub file_store: F,
}

impl<R, F> StudentHandler<R, F>
where
    R: StudentRepository,
    F: FileStore,
{
    pub fn new(student_repo: R, file_store: F) -> Self {
        StudentHandler {
            student_repo,
            file_store,
        }
    }

    async fn get_student_or_not_found(&self, id: i64) -> Result<Student, AppError> {
        self.student_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", id)))
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, AppError> {
        self.student_repo.find_all().await
    }

    pub async fn get_student(&self, id: i64) -> Result<Student, AppError> {
        self.get_student_or_not_found(id).await
    }

    /// Validates and persists a new student with the default photo
    pub async fn create_student(&self, request: StudentForm) -> Result<Student, AppError> {
        let insert = request.prepare_for_insert()?;

        let student = self.student_repo.insert(&insert).await?;
        info!("Created student {}", student.id);

        Ok(student)
    }

    /// Overwrites name and date fields; the photo is left as it is
    pub async fn update_student(&self, id: i64, request: StudentForm) -> Result<Student, AppError> {
        let mut student = self.get_student_or_not_found(id).await?;

        request.apply_to(&mut student)?;

        self.student_repo.save(&student).await
    }

    /// Stores a new photo, points the student at it, then drops the old one.
    ///
    /// The old file is only removed once the new `image_path` is persisted. If
    /// persisting fails the freshly stored file is left behind unreferenced.
    pub async fn upload_photo(
        &self,
        id: i64,
        content: &[u8],
        suggested_name: &str,
    ) -> Result<PhotoUpload, AppError> {
        let mut student = self.get_student_or_not_found(id).await?;

        if content.is_empty() {
            return Ok(PhotoUpload::Unchanged(student));
        }

        let filename = self.file_store.store(content, suggested_name).await?;
        let previous = std::mem::replace(&mut student.image_path, filename);

        let saved = match self.student_repo.save(&student).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    "Saving student {} failed, {} is now orphaned: {}",
                    id, student.image_path, e
                );
                return Err(e);
            }
        };

        if previous != DEFAULT_IMAGE {
            match self.file_store.delete(&previous).await {
                Ok(true) => {}
                Ok(false) => warn!("Previous photo {} of student {} was already gone", previous, id),
                Err(e) => {
                    warn!("Student {} updated but old photo {} was not removed: {}", id, previous, e);
                    return Err(e.into());
                }
            }
        }

        Ok(PhotoUpload::Replaced(saved))
    }

    /// Deletes the student's photo, then the student.
    ///
    /// The record is kept whenever the photo was not actually removed, whether
    /// it failed or was already missing.
    pub async fn delete_student(&self, id: i64) -> Result<(), AppError> {
        let student = self.get_student_or_not_found(id).await?;

        if student.has_custom_photo() {
            match self.file_store.delete(&student.image_path).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Keeping student {}: photo {} was not found", id, student.image_path);
                    return Err(StorageError::Io(format!(
                        "photo {} could not be deleted: file not found",
                        student.image_path
                    ))
                    .into());
                }
                Err(e) => {
                    warn!("Keeping student {}: photo {} could not be deleted: {}", id, student.image_path, e);
                    return Err(e.into());
                }
            }
        }

        self.student_repo.delete_by_id(id).await?;
        info!("Deleted student {}", id);

        Ok(())
    }
}
