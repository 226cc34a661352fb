use guardians_common::db::galaxy::Dao;
use guardians_common::db::{self, GalaxyStore};
use guardians_common::email::senders::{MockSender, SmtpSender};
use guardians_common::email::EmailSender;
use guardians_common::recovery::{RecoveryNotifier, RecoveryService};
use guardians_common::stellar::horizon::HorizonClient;
use guardians_common::stellar::signers::SignerTransactionBuilder;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};
use std::sync::Arc;

mod env;
mod handlers;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = {
                    let next_arg = args.next();

                    match next_arg {
                        Some(s) => s,
                        None => {
                            eprintln!("ERROR: --port option specified but no port was given");
                            std::process::exit(1);
                        }
                    }
                };

                port = {
                    let port_result = port_str.parse::<u16>();

                    match port_result {
                        Ok(p) => p,
                        Err(_) => {
                            eprintln!("ERROR: Incorrect format for port. Integer expected");
                            std::process::exit(1);
                        }
                    }
                };

                continue;
            }
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let base_addr = format!("127.0.0.1:{}", &port);

    let log_spec = match LogSpecification::parse(&env::CONF.log_level) {
        Ok(s) => s,
        Err(_) => {
            eprintln!("ERROR: Invalid log level '{}'", env::CONF.log_level);
            std::process::exit(1);
        }
    };

    let _logger = Logger::with(log_spec)
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = env::CONF.actix_worker_count;

    // To prevent resource starvation, max connections must be at least as large as the number of
    // actix workers
    let db_max_connections = std::cmp::max(env::CONF.db_max_connections, actix_workers as u32);

    log::info!("Connecting to database...");

    let db_thread_pool = db::create_db_thread_pool(
        &env::CONF.database_uri(),
        db_max_connections,
        env::CONF.db_idle_timeout,
    );

    log::info!("Successfully connected to database");

    let email_sender: EmailSender = if env::CONF.email_enabled {
        log::info!("Connecting to SMTP relay...");

        let smtp_sender = match SmtpSender::with_credentials(
            &env::CONF.smtp_username,
            &env::CONF.smtp_password,
            &env::CONF.smtp_address,
            env::CONF.max_smtp_connections,
            env::CONF.smtp_idle_timeout,
        ) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to create SMTP transport: {e}");
                std::process::exit(1);
            }
        };

        match smtp_sender.test_connection().await {
            Ok(true) => (),
            Ok(false) => panic!("Failed to connect to SMTP relay"),
            Err(e) => panic!("Failed to connect to SMTP relay: {e}"),
        }

        log::info!("Successfully connected to SMTP relay");

        Box::new(smtp_sender)
    } else {
        log::info!("Emails are disabled. Using mock email sender.");
        Box::new(MockSender::new())
    };

    let horizon_client = match HorizonClient::new(&env::CONF.horizon_url, env::CONF.horizon_timeout)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Failed to create Horizon client: {e}");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn GalaxyStore> = Arc::new(Dao::new(&db_thread_pool));
    let notifier = RecoveryNotifier::new(
        env::CONF.email_from_address.clone(),
        env::CONF.email_reply_to_address.clone(),
        &env::CONF.recovery_url,
    );

    let recovery_service = Data::new(RecoveryService::new(
        store,
        Arc::new(email_sender),
        notifier,
    ));
    let signer_builder = Data::new(SignerTransactionBuilder::new(
        Arc::new(horizon_client),
        &env::CONF.network_passphrase,
    ));

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db_thread_pool.clone()))
            .app_data(recovery_service.clone())
            .app_data(signer_builder.clone())
            .app_data(handlers::error::json_config())
            .configure(services::api::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    // Safe because all other threads have been joined at this point
    unsafe {
        env::CONF.zeroize();
    }

    Ok(())
}
