use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use std::time::Duration;
use sysinfo::System;
use serde::Serialize;

use crate::{constants::START_TIME, repositories::student::StudentRepository, storage::FileStore, AppState};

#[derive(Serialize)]
struct SystemInfo {
    os: String,
    kernel: String,
    hostname: String,
    cpu_count: usize,
    memory_total: String,
}

#[derive(Serialize)]
struct HealthCheckResponse {
    status: String,
    uptime: String,
    timestamp: String,
    start_at: String,
    database: String,
    storage: String,
    stored_files: usize,
    version: String,
    system: SystemInfo,
}

fn system_info() -> SystemInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_all();

    SystemInfo {
        os: System::name().unwrap_or_else(|| "Unknown".to_string()),
        kernel: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
        hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        cpu_count: sys.cpus().len(),
        memory_total: format!("{:.2} GB", sys.total_memory() as f64 / 1024.0 / 1024.0 / 1024.0),
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = chrono::Utc::now();
    let uptime_duration = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime_duration.num_seconds().max(0) as u64));

    let database = match state.student_handler.student_repo.check_connection().await {
        Ok(_) => "OK",
        Err(e) => {
            tracing::warn!("Health check: database unavailable: {}", e);
            "Unavailable"
        }
    };

    let (storage, stored_files) = match state.file_store.list_all().await {
        Ok(files) => ("OK", files.len()),
        Err(e) => {
            tracing::warn!("Health check: storage unavailable: {}", e);
            ("Unavailable", 0)
        }
    };

    let status = if database == "OK" && storage == "OK" { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthCheckResponse {
        status: status.to_string(),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        database: database.to_string(),
        storage: storage.to_string(),
        stored_files,
        version: env!("CARGO_PKG_VERSION").to_string(),
        system: system_info(),
    })
}
