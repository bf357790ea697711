use actix_web::web;

use crate::handlers::files::{self, SERVE_FILE_ROUTE};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .service(
                web::resource("")
                    .route(web::get().to(files::list_files))
                    .route(web::post().to(files::upload_file))
            )
            .service(
                web::resource("/{filename}")
                    .name(SERVE_FILE_ROUTE)
                    .route(web::get().to(files::serve_file))
            )
    );
}
