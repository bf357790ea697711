use actix_multipart::form::MultipartForm;
use actix_web::{
    http::header::{CacheControl, CacheDirective, ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse, Responder,
};
use tracing::instrument;

use crate::{
    entities::stored_file::{FileUpload, FileUploadResponse},
    errors::{AppError, StorageError},
    storage::FileStore,
    AppState,
};

/// Name of the route serving a single file, used to build listing URLs.
pub const SERVE_FILE_ROUTE: &str = "serve_file";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[instrument(skip(req, state))]
pub async fn list_files(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let names = state.file_store.list_all().await?;

    let urls = names
        .iter()
        .map(|name| {
            req.url_for(SERVE_FILE_ROUTE, [name])
                .map(|url| url.to_string())
                .map_err(|e| AppError::InternalError(format!("building URL for {}: {}", name, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(urls))
}

#[instrument(skip(state, form))]
pub async fn upload_file(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<FileUpload>,
) -> Result<impl Responder, AppError> {
    let content = tokio::fs::read(form.file.file.path())
        .await
        .map_err(|e| StorageError::Io(format!("reading upload: {}", e)))?;

    let filename = state.file_store.store(&content, form.suggested_name()).await?;

    Ok(HttpResponse::Ok().json(FileUploadResponse {
        message: format!("You successfully uploaded {}!", filename),
        filename,
    }))
}

#[instrument(skip(state))]
pub async fn serve_file(
    filename: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let Some(resource) = state.file_store.load_as_resource(&filename).await? else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("File not found: {}", filename)
        })));
    };

    let bytes = resource.read().await?;
    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_CONTENT_TYPE);

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Inline,
            parameters: vec![DispositionParam::Filename(resource.filename.clone())],
        })
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(state.file_cache_seconds),
        ]))
        .body(bytes))
}
