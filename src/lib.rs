use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, storage, web};

use repositories::{sqlx_repo::SqlxStudentRepo, student::StudentRepository};
use storage::LocalFileStore;
use use_cases::student::StudentHandler;

pub struct AppState {
    pub student_handler: AppStudentHandler,
    pub file_store: LocalFileStore,
    pub file_cache_seconds: u32,
}

pub type AppStudentHandler = StudentHandler<Arc<dyn StudentRepository>, LocalFileStore>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool, file_store: LocalFileStore) -> Self {
        let student_repo: Arc<dyn StudentRepository> = Arc::new(SqlxStudentRepo::new(pool));

        AppState::with_repository(student_repo, file_store, config.file_cache_seconds)
    }

    /// Wires the state around any record store, e.g. an in-memory one in tests.
    pub fn with_repository(
        student_repo: Arc<dyn StudentRepository>,
        file_store: LocalFileStore,
        file_cache_seconds: u32,
    ) -> Self {
        AppState {
            student_handler: StudentHandler::new(student_repo, file_store.clone()),
            file_store,
            file_cache_seconds,
        }
    }
}
