use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod students;
mod files;
pub mod payload_errors;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .service(health_check)
            .configure(students::config_routes)
            .configure(files::config_routes)
    );

    cfg.configure(payload_errors::config_routes);
}
