use guardians_common::db::DbThreadPool;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::env;
use crate::handlers::error::HttpErrorResponse;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    db_thread_pool: web::Data<DbThreadPool>,
    query: web::Query<HealthKeyQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if !is_health_key_correct(query.key.as_deref(), &env::CONF.health_endpoint_key) {
        return Err(HttpErrorResponse::IncorrectCredential(String::from(
            "Health endpoint key is incorrect",
        )));
    }

    let pool_state = db_thread_pool.state();
    let resp_body = json!({
        "db_thread_pool_state": {
            "connections": pool_state.connections,
            "idle_connections": pool_state.idle_connections
        }
    });

    Ok(HttpResponse::Ok().json(resp_body))
}

#[inline]
fn is_health_key_correct(key: Option<&str>, correct_key: &str) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = correct_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Do bitwise comparison to prevent timing attacks
    let keys_dont_match = correct_key
        .iter()
        .zip(key.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    keys_dont_match == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{self, TestRequest};
    use actix_web::App;

    #[actix_web::test]
    async fn test_heartbeat() {
        let app =
            test::init_service(App::new().route("/heartbeat", web::get().to(heartbeat))).await;

        let req = TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    }

    #[test]
    fn test_health_key_comparison() {
        const KEY: &str = "f1d8a7c2e0b94f63";

        assert!(is_health_key_correct(Some(KEY), KEY));
        assert!(!is_health_key_correct(Some("f1d8a7c2e0b94f64"), KEY));
        assert!(!is_health_key_correct(Some("short"), KEY));
        assert!(!is_health_key_correct(Some(""), ""));
        assert!(!is_health_key_correct(None, KEY));
    }
}
