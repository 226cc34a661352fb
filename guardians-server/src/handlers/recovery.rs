use guardians_common::recovery::RecoveryService;
use guardians_common::request_io::inputs::{InputGalaxy, InputGalaxyUpdate, InputRecoveryKey};
use guardians_common::request_io::outputs::OutputGalaxy;
use guardians_common::validators::{self, Validity};

use actix_web::{web, HttpResponse};

use crate::handlers::error::HttpErrorResponse;

pub async fn create_galaxy(
    recovery_service: web::Data<RecoveryService>,
    galaxy: web::Json<InputGalaxy>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = galaxy.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let created = recovery_service.create_galaxy(&galaxy).await?;

    Ok(HttpResponse::Created().json(OutputGalaxy::from(created)))
}

pub async fn get_galaxy(
    recovery_service: web::Data<RecoveryService>,
    wallet_address: web::Path<String>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let galaxy = recovery_service.get_galaxy(&wallet_address).await?;

    Ok(HttpResponse::Ok().json(OutputGalaxy::from(galaxy)))
}

pub async fn update_galaxy(
    recovery_service: web::Data<RecoveryService>,
    wallet_address: web::Path<String>,
    update: web::Json<InputGalaxyUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = update.validate() {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let updated = recovery_service
        .update_galaxy(&wallet_address, &update)
        .await?;

    Ok(HttpResponse::Ok().json(OutputGalaxy::from(updated)))
}

pub async fn begin_recovery(
    recovery_service: web::Data<RecoveryService>,
    recovery_key: web::Json<InputRecoveryKey>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Validity::Invalid(msg) = validators::validate_not_blank(&recovery_key.key, "Key") {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let galaxy = recovery_service.begin_recovery(&recovery_key.key).await?;

    Ok(HttpResponse::Ok().json(OutputGalaxy::from(galaxy)))
}
