use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::models::galaxy::{GalaxyUpdate, GalaxyWithGuardians, NewGalaxy};
use crate::models::guardian::NewGuardian;

pub mod galaxy;
pub mod memory;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_db_thread_pool(
    database_uri: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
) -> DbThreadPool {
    r2d2::Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .build(ConnectionManager::<PgConnection>::new(database_uri))
        .expect("Failed to create DB thread pool")
}

/// Persistence for galaxies and their guardians.
///
/// Implementations are synchronous; async callers should move calls onto a blocking thread.
/// Lookup misses are reported as `DaoError::QueryFailure(diesel::result::Error::NotFound)` and a
/// duplicate recovery address as a `UniqueViolation` database error, whatever the backing store.
pub trait GalaxyStore: Send + Sync {
    fn find_by_recovery_address(
        &self,
        recovery_address: &str,
    ) -> Result<GalaxyWithGuardians, DaoError>;

    /// Inserts the galaxy and all of its guardians atomically.
    fn insert_galaxy(
        &self,
        new_galaxy: &NewGalaxy,
        new_guardians: &[NewGuardian],
    ) -> Result<GalaxyWithGuardians, DaoError>;

    /// Applies the update atomically and returns the galaxy as it stands afterwards.
    fn update_galaxy(
        &self,
        galaxy_id: Uuid,
        update: &GalaxyUpdate,
    ) -> Result<GalaxyWithGuardians, DaoError>;

    fn set_recovery_secret(&self, guardian_id: Uuid, recovery_secret: &str)
        -> Result<(), DaoError>;
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    CannotRunQuery(&'static str),
}

impl DaoError {
    pub fn not_found() -> Self {
        DaoError::QueryFailure(diesel::result::Error::NotFound)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::QueryFailure(diesel::result::Error::NotFound))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))
        )
    }
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}
