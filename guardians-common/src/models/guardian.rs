use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::models::galaxy::Galaxy;
use crate::schema::guardians;

#[derive(Clone, Debug, Serialize, Deserialize, Associations, Identifiable, Queryable)]
#[diesel(belongs_to(Galaxy, foreign_key = galaxy_id))]
#[diesel(table_name = guardians)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Guardian {
    pub id: Uuid,
    pub galaxy_id: Uuid,
    pub email: String,
    pub account: String,
    pub phrase: String,
    pub private_key: String,
    pub recovery_secret: Option<String>,
    pub created_timestamp: SystemTime,
    pub updated_timestamp: SystemTime,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = guardians)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewGuardian {
    pub id: Uuid,
    pub galaxy_id: Uuid,
    pub email: String,
    pub account: String,
    pub phrase: String,
    pub private_key: String,
    pub created_timestamp: SystemTime,
    pub updated_timestamp: SystemTime,
}

impl NewGuardian {
    pub fn into_guardian(self) -> Guardian {
        Guardian {
            id: self.id,
            galaxy_id: self.galaxy_id,
            email: self.email,
            account: self.account,
            phrase: self.phrase,
            private_key: self.private_key,
            recovery_secret: None,
            created_timestamp: self.created_timestamp,
            updated_timestamp: self.updated_timestamp,
        }
    }
}
