use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::guardian::{Guardian, NewGuardian};
use crate::schema::galaxies;

#[derive(Clone, Debug, Serialize, Deserialize, Identifiable, Queryable)]
#[diesel(table_name = galaxies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Galaxy {
    pub id: Uuid,
    pub name: String,
    pub recovery_address: String,
    pub created_timestamp: SystemTime,
    pub updated_timestamp: SystemTime,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = galaxies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewGalaxy {
    pub id: Uuid,
    pub name: String,
    pub recovery_address: String,
    pub created_timestamp: SystemTime,
    pub updated_timestamp: SystemTime,
}

/// A galaxy row together with every guardian row that belongs to it, oldest guardian first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GalaxyWithGuardians {
    pub galaxy: Galaxy,
    pub guardians: Vec<Guardian>,
}

/// Changes applied to an existing galaxy in a single transaction. When `guardians` is set, the
/// galaxy's current guardian rows are deleted and replaced wholesale.
#[derive(Clone, Debug, Default)]
pub struct GalaxyUpdate {
    pub recovery_address: Option<String>,
    pub guardians: Option<Vec<NewGuardian>>,
}
