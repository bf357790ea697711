use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{
        stored_file::FileUpload,
        student::{PhotoUploadResponse, StudentDeletedResponse, StudentForm},
    },
    errors::{AppError, StorageError},
    use_cases::student::PhotoUpload,
    AppState,
};

#[instrument(skip(state))]
pub async fn list_students(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let students = state.student_handler.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

#[instrument(skip(state))]
pub async fn get_student(
    student_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let student = state.student_handler.get_student(student_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(student))
}

#[instrument(skip(state, data))]
pub async fn create_student(
    state: web::Data<AppState>,
    data: web::Json<StudentForm>,
) -> Result<impl Responder, AppError> {
    let student = state.student_handler.create_student(data.into_inner()).await?;
    Ok(HttpResponse::Created().json(student))
}

#[instrument(skip(state, data))]
pub async fn update_student(
    student_id: web::Path<i64>,
    state: web::Data<AppState>,
    data: web::Json<StudentForm>,
) -> Result<impl Responder, AppError> {
    let student = state.student_handler
        .update_student(student_id.into_inner(), data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(student))
}

#[instrument(skip(state))]
pub async fn delete_student(
    student_id: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = student_id.into_inner();
    state.student_handler.delete_student(id).await?;

    Ok(HttpResponse::Ok().json(StudentDeletedResponse {
        message: "Student and image deleted successfully".to_string(),
        id,
    }))
}

#[instrument(skip(state, form))]
pub async fn upload_photo(
    student_id: web::Path<i64>,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<FileUpload>,
) -> Result<impl Responder, AppError> {
    let content = tokio::fs::read(form.file.file.path())
        .await
        .map_err(|e| StorageError::Io(format!("reading upload: {}", e)))?;

    let outcome = state.student_handler
        .upload_photo(student_id.into_inner(), &content, form.suggested_name())
        .await?;

    let response = match outcome {
        PhotoUpload::Replaced(student) => HttpResponse::Created().json(PhotoUploadResponse {
            message: "Image uploaded successfully".to_string(),
            student,
        }),
        PhotoUpload::Unchanged(student) => HttpResponse::Ok().json(PhotoUploadResponse {
            message: "Empty file, student left unchanged".to_string(),
            student,
        }),
    };

    Ok(response)
}
