use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{DaoError, GalaxyStore};
use crate::models::galaxy::{Galaxy, GalaxyUpdate, GalaxyWithGuardians, NewGalaxy};
use crate::models::guardian::NewGuardian;

/// A `GalaxyStore` kept entirely in process memory. Enforces the same uniqueness rule on
/// recovery addresses as the database schema.
#[derive(Default)]
pub struct MemoryStore {
    galaxies: Mutex<HashMap<Uuid, GalaxyWithGuardians>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn galaxy_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, GalaxyWithGuardians>> {
        // Every mutation is validated before it is written, so a poisoned map is still consistent
        self.galaxies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unique_violation() -> DaoError {
    DaoError::QueryFailure(DieselError::DatabaseError(
        DatabaseErrorKind::UniqueViolation,
        Box::new(String::from(
            "duplicate key value violates unique constraint \"galaxies_recovery_address_key\"",
        )),
    ))
}

fn address_taken(
    galaxies: &HashMap<Uuid, GalaxyWithGuardians>,
    recovery_address: &str,
    except: Option<Uuid>,
) -> bool {
    galaxies.values().any(|g| {
        g.galaxy.recovery_address == recovery_address && Some(g.galaxy.id) != except
    })
}

impl GalaxyStore for MemoryStore {
    fn find_by_recovery_address(
        &self,
        recovery_address: &str,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        self.lock()
            .values()
            .find(|g| g.galaxy.recovery_address == recovery_address)
            .cloned()
            .ok_or_else(DaoError::not_found)
    }

    fn insert_galaxy(
        &self,
        new_galaxy: &NewGalaxy,
        new_guardians: &[NewGuardian],
    ) -> Result<GalaxyWithGuardians, DaoError> {
        if new_guardians.is_empty() {
            return Err(DaoError::CannotRunQuery(
                "A galaxy must be created with at least one guardian",
            ));
        }

        let mut galaxies = self.lock();

        if galaxies.contains_key(&new_galaxy.id)
            || address_taken(&galaxies, &new_galaxy.recovery_address, None)
        {
            return Err(unique_violation());
        }

        let created = GalaxyWithGuardians {
            galaxy: Galaxy {
                id: new_galaxy.id,
                name: new_galaxy.name.clone(),
                recovery_address: new_galaxy.recovery_address.clone(),
                created_timestamp: new_galaxy.created_timestamp,
                updated_timestamp: new_galaxy.updated_timestamp,
            },
            guardians: new_guardians
                .iter()
                .cloned()
                .map(NewGuardian::into_guardian)
                .collect(),
        };

        galaxies.insert(new_galaxy.id, created.clone());

        Ok(created)
    }

    fn update_galaxy(
        &self,
        galaxy_id: Uuid,
        update: &GalaxyUpdate,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        if update.guardians.as_ref().is_some_and(|g| g.is_empty()) {
            return Err(DaoError::CannotRunQuery(
                "A galaxy's guardians cannot be replaced with an empty set",
            ));
        }

        let mut galaxies = self.lock();

        if let Some(recovery_address) = &update.recovery_address {
            if address_taken(&galaxies, recovery_address, Some(galaxy_id)) {
                return Err(unique_violation());
            }
        }

        let existing = galaxies.get_mut(&galaxy_id).ok_or_else(DaoError::not_found)?;

        if let Some(recovery_address) = &update.recovery_address {
            existing.galaxy.recovery_address = recovery_address.clone();
        }

        if let Some(new_guardians) = &update.guardians {
            existing.guardians = new_guardians
                .iter()
                .cloned()
                .map(NewGuardian::into_guardian)
                .collect();
        }

        existing.galaxy.updated_timestamp = SystemTime::now();

        Ok(existing.clone())
    }

    fn set_recovery_secret(
        &self,
        guardian_id: Uuid,
        recovery_secret: &str,
    ) -> Result<(), DaoError> {
        let mut galaxies = self.lock();

        let guardian = galaxies
            .values_mut()
            .flat_map(|g| g.guardians.iter_mut())
            .find(|g| g.id == guardian_id)
            .ok_or_else(DaoError::not_found)?;

        guardian.recovery_secret = Some(String::from(recovery_secret));
        guardian.updated_timestamp = SystemTime::now();

        Ok(())
    }
}
