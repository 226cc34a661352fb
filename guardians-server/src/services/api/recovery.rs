use actix_web::web::*;

use crate::handlers::recovery;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/recovery")
            .service(resource("/create-galaxy").route(post().to(recovery::create_galaxy)))
            .service(
                resource("/get-galaxy/{wallet_address}").route(get().to(recovery::get_galaxy)),
            )
            .service(
                resource("/update-galaxy/{wallet_address}")
                    .route(patch().to(recovery::update_galaxy)),
            )
            .service(resource("/begin-recovery").route(post().to(recovery::begin_recovery))),
    );
}
