use actix_web::web::*;

use crate::handlers::stellar;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/stellar").service(
            resource("/signer-transaction").route(post().to(stellar::build_signer_transaction)),
        ),
    );
}
