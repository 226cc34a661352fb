pub mod health;
pub mod recovery;
pub mod stellar;

pub mod error {
    use guardians_common::recovery::RecoveryError;
    use guardians_common::stellar::horizon::HorizonError;
    use guardians_common::stellar::signers::SignerUpdateError;

    use actix_web::http::StatusCode;
    use actix_web::{web, HttpResponse, HttpResponseBuilder};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ErrorType {
        IncorrectlyFormed,
        ConflictWithExisting,
        EmailFailure,
        IncorrectCredential,
        GalaxyDoesNotExist,
        AccountDoesNotExist,
        UpstreamFailure,
        InternalError,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServerErrorResponse {
        pub err_type: ErrorType,
        pub err_message: String,
    }

    #[derive(Debug)]
    pub enum DoesNotExistType {
        Galaxy,
        Account,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        ConflictWithExisting(String),
        EmailFailure(String),

        // 401
        IncorrectCredential(String),

        // 404
        DoesNotExist(String, DoesNotExistType),

        // 502
        UpstreamFailure(String),

        // 500
        InternalError(String),
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::ConflictWithExisting(msg) => ServerErrorResponse {
                    err_type: ErrorType::ConflictWithExisting,
                    err_message: format!("Conflict with existing data: {msg}"),
                },
                HttpErrorResponse::EmailFailure(msg) => ServerErrorResponse {
                    err_type: ErrorType::EmailFailure,
                    err_message: format!("Failed to send email: {msg}"),
                },

                // 401
                HttpErrorResponse::IncorrectCredential(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectCredential,
                    err_message: format!("Incorrect credential: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, dne_type) => ServerErrorResponse {
                    err_type: match dne_type {
                        DoesNotExistType::Galaxy => ErrorType::GalaxyDoesNotExist,
                        DoesNotExistType::Account => ErrorType::AccountDoesNotExist,
                    },
                    err_message: format!("Does not exist: {msg}"),
                },

                // 502
                HttpErrorResponse::UpstreamFailure(msg) => ServerErrorResponse {
                    err_type: ErrorType::UpstreamFailure,
                    err_message: format!("Upstream failure: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: format!("Internal error: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::ConflictWithExisting(_)
                | HttpErrorResponse::EmailFailure(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::IncorrectCredential(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<RecoveryError> for HttpErrorResponse {
        fn from(err: RecoveryError) -> Self {
            match err {
                RecoveryError::GalaxyNotFound => HttpErrorResponse::DoesNotExist(
                    String::from("No galaxy has this recovery address"),
                    DoesNotExistType::Galaxy,
                ),
                RecoveryError::RecoveryAddressTaken => HttpErrorResponse::ConflictWithExisting(
                    String::from("A galaxy with this recovery address already exists"),
                ),
                RecoveryError::Email(e) => HttpErrorResponse::EmailFailure(e.to_string()),
                RecoveryError::Store(e) => {
                    log::error!("{e}");
                    HttpErrorResponse::InternalError(String::from("Failed to access galaxies"))
                }
                RecoveryError::BlockingPoolFailure => {
                    HttpErrorResponse::InternalError(String::from("Blocking thread pool failure"))
                }
            }
        }
    }

    impl From<SignerUpdateError> for HttpErrorResponse {
        fn from(err: SignerUpdateError) -> Self {
            match err {
                SignerUpdateError::InvalidAccount(_)
                | SignerUpdateError::InvalidSigner(_, _)
                | SignerUpdateError::NoSigners
                | SignerUpdateError::TooManySigners(_)
                | SignerUpdateError::ZeroVotersThreshold => {
                    HttpErrorResponse::IncorrectlyFormed(err.to_string())
                }
                SignerUpdateError::SequenceLookupFailed(HorizonError::AccountNotFound) => {
                    HttpErrorResponse::DoesNotExist(
                        String::from("Account was not found on the network"),
                        DoesNotExistType::Account,
                    )
                }
                SignerUpdateError::SequenceLookupFailed(e) => {
                    log::error!("{e}");
                    HttpErrorResponse::UpstreamFailure(String::from(
                        "Failed to load account from Horizon",
                    ))
                }
                SignerUpdateError::SequenceOverflow | SignerUpdateError::EncodingFailed(_) => {
                    log::error!("{err}");
                    HttpErrorResponse::InternalError(String::from(
                        "Failed to build signer transaction",
                    ))
                }
            }
        }
    }

    /// Rejects unparseable JSON bodies with the same error shape as every other failure.
    pub fn json_config() -> web::JsonConfig {
        web::JsonConfig::default().error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use actix_web::body::to_bytes;
        use actix_web::ResponseError;

        #[actix_web::test]
        async fn error_body_is_json() {
            let resp = HttpErrorResponse::DoesNotExist(
                String::from("No galaxy"),
                DoesNotExistType::Galaxy,
            )
            .error_response();

            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let body = to_bytes(resp.into_body()).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

            assert_eq!(body["errType"], "GalaxyDoesNotExist");
            assert_eq!(body["errMessage"], "Does not exist: No galaxy");
        }

        #[test]
        fn recovery_errors_map_to_statuses() {
            assert_eq!(
                HttpErrorResponse::from(RecoveryError::GalaxyNotFound).status_code(),
                StatusCode::NOT_FOUND
            );
            assert_eq!(
                HttpErrorResponse::from(RecoveryError::RecoveryAddressTaken).status_code(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                HttpErrorResponse::from(RecoveryError::BlockingPoolFailure).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }

        #[test]
        fn signer_errors_map_to_statuses() {
            assert_eq!(
                HttpErrorResponse::from(SignerUpdateError::ZeroVotersThreshold).status_code(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                HttpErrorResponse::from(SignerUpdateError::SequenceLookupFailed(
                    HorizonError::AccountNotFound
                ))
                .status_code(),
                StatusCode::NOT_FOUND
            );
            assert_eq!(
                HttpErrorResponse::from(SignerUpdateError::SequenceLookupFailed(
                    HorizonError::UnexpectedStatus(503)
                ))
                .status_code(),
                StatusCode::BAD_GATEWAY
            );
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use guardians_common::db::memory::MemoryStore;
    use guardians_common::email::senders::{MockSender, SentEmail};
    use guardians_common::email::EmailSender;
    use guardians_common::recovery::{RecoveryNotifier, RecoveryService};
    use guardians_common::stellar::horizon::test_utils::{FixedSequence, MissingAccount};
    use guardians_common::stellar::keypair::GuardianKeypair;
    use guardians_common::stellar::signers::SignerTransactionBuilder;
    use guardians_common::stellar::TESTNET_PASSPHRASE;

    use actix_web::web::Data;
    use std::sync::{Arc, Mutex};

    pub struct TestState {
        pub recovery_service: Data<RecoveryService>,
        pub store: Arc<MemoryStore>,
        pub outbox: Arc<Mutex<Vec<SentEmail>>>,
    }

    pub fn recovery_state() -> TestState {
        recovery_state_with_sender(MockSender::new())
    }

    pub fn recovery_state_with_sender(sender: MockSender) -> TestState {
        let store = Arc::new(MemoryStore::new());
        let outbox = sender.outbox();
        let email_sender: Arc<EmailSender> = Arc::new(Box::new(sender));

        let notifier = RecoveryNotifier::new(
            "Guardians <no-reply@guardians.test>".parse().unwrap(),
            "support@guardians.test".parse().unwrap(),
            "https://guardians.test/recover",
        );

        TestState {
            recovery_service: Data::new(RecoveryService::new(store.clone(), email_sender, notifier)),
            store,
            outbox,
        }
    }

    pub fn signer_builder(current_sequence: i64) -> SignerTransactionBuilder {
        SignerTransactionBuilder::new(Arc::new(FixedSequence(current_sequence)), TESTNET_PASSPHRASE)
    }

    pub fn missing_account_signer_builder() -> SignerTransactionBuilder {
        SignerTransactionBuilder::new(Arc::new(MissingAccount), TESTNET_PASSPHRASE)
    }

    pub fn random_account() -> String {
        GuardianKeypair::random().account()
    }

    pub fn unique_email() -> String {
        format!("guardian-{}@guardians.test", uuid::Uuid::now_v7().simple())
    }
}
