use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Student Registry API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "students": "/api/v1/students",
        "files": "/api/v1/files"
    }))
}
