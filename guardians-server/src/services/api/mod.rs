use actix_web::web::*;

mod health;
mod recovery;
mod stellar;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.configure(recovery::configure)
        .configure(stellar::configure)
        .configure(health::configure);
}
