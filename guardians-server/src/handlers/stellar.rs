use guardians_common::request_io::inputs::InputSignerUpdate;
use guardians_common::request_io::outputs::OutputSignerTransaction;
use guardians_common::stellar::signers::{SignerTransactionBuilder, SignerUpdate};

use actix_web::{web, HttpResponse};

use crate::handlers::error::HttpErrorResponse;

/// Returns an unsigned transaction adding the given keys as weighted signers of `account`. The
/// caller's wallet signs and submits it.
pub async fn build_signer_transaction(
    signer_builder: web::Data<SignerTransactionBuilder>,
    signer_update: web::Json<InputSignerUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let update = SignerUpdate::new(
        &signer_update.account,
        &signer_update.signers,
        signer_update.voters_threshold,
    )?;

    let unsigned = signer_builder.build(&update).await?;

    Ok(HttpResponse::Ok().json(OutputSignerTransaction::from(unsigned)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;
    use guardians_common::stellar::TESTNET_PASSPHRASE;
    use serde_json::json;

    use crate::handlers::error::{json_config, ErrorType, ServerErrorResponse};
    use crate::handlers::test_utils;

    #[actix_web::test]
    async fn test_build_signer_transaction() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(test_utils::signer_builder(7)))
                .app_data(json_config())
                .configure(crate::services::api::configure),
        )
        .await;

        let req = TestRequest::post()
            .uri("/stellar/signer-transaction")
            .set_json(json!({
                "account": test_utils::random_account(),
                "signers": [test_utils::random_account(), test_utils::random_account()],
                "votersThreshold": 2,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let tx: OutputSignerTransaction = test::read_body_json(resp).await;
        assert_eq!(tx.operation_count, 4);
        assert_eq!(tx.network_passphrase, TESTNET_PASSPHRASE);
        assert!(!tx.transaction_xdr.is_empty());
    }

    #[actix_web::test]
    async fn test_build_signer_transaction_rejects_bad_input() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(test_utils::signer_builder(7)))
                .app_data(json_config())
                .configure(crate::services::api::configure),
        )
        .await;

        let bodies = [
            json!({
                "account": "GNOTANACCOUNT",
                "signers": [test_utils::random_account()],
                "votersThreshold": 1,
            }),
            json!({
                "account": test_utils::random_account(),
                "signers": [test_utils::random_account()],
                "votersThreshold": 0,
            }),
            json!({
                "account": test_utils::random_account(),
                "signers": [],
                "votersThreshold": 1,
            }),
        ];

        for body in bodies {
            let req = TestRequest::post()
                .uri("/stellar/signer-transaction")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let err: ServerErrorResponse = test::read_body_json(resp).await;
            assert_eq!(err.err_type, ErrorType::IncorrectlyFormed);
        }
    }

    #[actix_web::test]
    async fn test_build_signer_transaction_unknown_account() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(test_utils::missing_account_signer_builder()))
                .app_data(json_config())
                .configure(crate::services::api::configure),
        )
        .await;

        let req = TestRequest::post()
            .uri("/stellar/signer-transaction")
            .set_json(json!({
                "account": test_utils::random_account(),
                "signers": [test_utils::random_account()],
                "votersThreshold": 1,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let err: ServerErrorResponse = test::read_body_json(resp).await;
        assert_eq!(err.err_type, ErrorType::AccountDoesNotExist);
    }
}
