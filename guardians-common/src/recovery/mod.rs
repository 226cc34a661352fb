use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{DaoError, GalaxyStore};
use crate::email::{EmailError, EmailSender};
use crate::models::galaxy::{GalaxyUpdate, GalaxyWithGuardians, NewGalaxy};
use crate::models::guardian::NewGuardian;
use crate::request_io::inputs::{InputGalaxy, InputGalaxyUpdate, InputGuardian};
use crate::stellar::keypair::GuardianKeypair;

mod notifier;

pub use notifier::RecoveryNotifier;

#[derive(Debug)]
pub enum RecoveryError {
    GalaxyNotFound,
    RecoveryAddressTaken,
    Email(EmailError),
    Store(DaoError),
    BlockingPoolFailure,
}

impl std::error::Error for RecoveryError {}

impl fmt::Display for RecoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryError::GalaxyNotFound => write!(f, "RecoveryError: Galaxy not found"),
            RecoveryError::RecoveryAddressTaken => write!(
                f,
                "RecoveryError: A galaxy with this recovery address already exists"
            ),
            RecoveryError::Email(e) => write!(f, "RecoveryError: {e}"),
            RecoveryError::Store(e) => write!(f, "RecoveryError: {e}"),
            RecoveryError::BlockingPoolFailure => {
                write!(f, "RecoveryError: Blocking task failed to complete")
            }
        }
    }
}

impl From<DaoError> for RecoveryError {
    fn from(error: DaoError) -> Self {
        if error.is_not_found() {
            RecoveryError::GalaxyNotFound
        } else if error.is_unique_violation() {
            RecoveryError::RecoveryAddressTaken
        } else {
            RecoveryError::Store(error)
        }
    }
}

impl From<EmailError> for RecoveryError {
    fn from(error: EmailError) -> Self {
        RecoveryError::Email(error)
    }
}

/// Galaxy lifecycle and the recovery email fan-out.
///
/// Store calls are synchronous and run on tokio's blocking pool.
pub struct RecoveryService {
    store: Arc<dyn GalaxyStore>,
    email_sender: Arc<EmailSender>,
    notifier: RecoveryNotifier,
}

impl RecoveryService {
    pub fn new(
        store: Arc<dyn GalaxyStore>,
        email_sender: Arc<EmailSender>,
        notifier: RecoveryNotifier,
    ) -> Self {
        Self {
            store,
            email_sender,
            notifier,
        }
    }

    pub async fn create_galaxy(
        &self,
        galaxy: &InputGalaxy,
    ) -> Result<GalaxyWithGuardians, RecoveryError> {
        let now = SystemTime::now();

        let new_galaxy = NewGalaxy {
            id: Uuid::now_v7(),
            name: galaxy.name.clone(),
            recovery_address: galaxy.recovery_address.clone(),
            created_timestamp: now,
            updated_timestamp: now,
        };
        let new_guardians = mint_guardians(new_galaxy.id, &galaxy.guardians, now);

        let created = self
            .run_blocking(move |store| store.insert_galaxy(&new_galaxy, &new_guardians))
            .await?;

        log::info!(
            "Created galaxy {} with {} guardians",
            created.galaxy.id,
            created.guardians.len()
        );

        Ok(created)
    }

    pub async fn get_galaxy(
        &self,
        recovery_address: &str,
    ) -> Result<GalaxyWithGuardians, RecoveryError> {
        let recovery_address = String::from(recovery_address);

        self.run_blocking(move |store| store.find_by_recovery_address(&recovery_address))
            .await
    }

    /// Returns the galaxy as it stands after the update. A supplied guardian list replaces the
    /// existing guardians, each with a freshly minted keypair.
    pub async fn update_galaxy(
        &self,
        recovery_address: &str,
        update: &InputGalaxyUpdate,
    ) -> Result<GalaxyWithGuardians, RecoveryError> {
        let existing = self.get_galaxy(recovery_address).await?;
        let galaxy_id = existing.galaxy.id;

        let galaxy_update = GalaxyUpdate {
            recovery_address: update.recovery_address.clone(),
            guardians: update
                .guardians
                .as_ref()
                .map(|guardians| mint_guardians(galaxy_id, guardians, SystemTime::now())),
        };

        let updated = self
            .run_blocking(move |store| store.update_galaxy(galaxy_id, &galaxy_update))
            .await?;

        log::info!(
            "Updated galaxy {} (address changed: {}, guardians replaced: {})",
            galaxy_id,
            update.recovery_address.is_some(),
            update.guardians.is_some(),
        );

        Ok(updated)
    }

    /// Copies every guardian's private key into its recovery secret and emails it, one guardian
    /// at a time. The first email failure stops the fan-out; secrets already written stay
    /// written.
    pub async fn begin_recovery(&self, key: &str) -> Result<GalaxyWithGuardians, RecoveryError> {
        let mut galaxy = self.get_galaxy(key).await?;
        let recovery_address = galaxy.galaxy.recovery_address.clone();

        log::warn!(
            "Recovery started for galaxy {}, notifying {} guardians",
            galaxy.galaxy.id,
            galaxy.guardians.len()
        );

        for guardian in galaxy.guardians.iter_mut() {
            let guardian_id = guardian.id;
            let secret = guardian.private_key.clone();
            let secret_copy = secret.clone();

            self.run_blocking(move |store| store.set_recovery_secret(guardian_id, &secret_copy))
                .await?;
            guardian.recovery_secret = Some(secret);
            guardian.updated_timestamp = SystemTime::now();

            if let Err(e) = self
                .notifier
                .send_recovery_secret(
                    &**self.email_sender,
                    &guardian.email,
                    &guardian.private_key,
                    &recovery_address,
                )
                .await
            {
                log::error!("Failed to email recovery secret to guardian {guardian_id}: {e}");
                return Err(RecoveryError::Email(e));
            }
        }

        Ok(galaxy)
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, RecoveryError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn GalaxyStore) -> Result<T, DaoError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);

        let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| {
                log::error!("{e}");
                RecoveryError::BlockingPoolFailure
            })?;

        result.map_err(|e| {
            let e = RecoveryError::from(e);
            if let RecoveryError::Store(inner) = &e {
                log::error!("{inner}");
            }

            e
        })
    }
}

fn mint_guardians(galaxy_id: Uuid, guardians: &[InputGuardian], now: SystemTime) -> Vec<NewGuardian> {
    guardians
        .iter()
        .map(|guardian| {
            let keypair = GuardianKeypair::random();

            NewGuardian {
                id: Uuid::now_v7(),
                galaxy_id,
                email: guardian.email.clone(),
                account: keypair.account(),
                phrase: guardian.phrase.clone(),
                private_key: String::from(keypair.private_key_hex().as_str()),
                created_timestamp: now,
                updated_timestamp: now,
            }
        })
        .collect()
}
