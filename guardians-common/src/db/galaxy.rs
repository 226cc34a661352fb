use diesel::pg::PgConnection;
use diesel::{dsl, BelongingToDsl, ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl};
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{DaoError, DbThreadPool, GalaxyStore};
use crate::models::galaxy::{Galaxy, GalaxyUpdate, GalaxyWithGuardians, NewGalaxy};
use crate::models::guardian::{Guardian, NewGuardian};
use crate::schema::galaxies as galaxy_fields;
use crate::schema::galaxies::dsl::galaxies;
use crate::schema::guardians as guardian_fields;
use crate::schema::guardians::dsl::guardians;

pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    pub fn get_galaxy_by_recovery_address(
        &self,
        recovery_address: &str,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        let mut db_connection = self.db_thread_pool.get()?;

        let output_galaxy = db_connection
            .build_transaction()
            .read_only()
            .run::<_, diesel::result::Error, _>(|conn| {
                let galaxy = galaxies
                    .filter(galaxy_fields::recovery_address.eq(recovery_address))
                    .first::<Galaxy>(conn)?;

                load_with_guardians(conn, galaxy)
            })?;

        Ok(output_galaxy)
    }

    pub fn create_galaxy(
        &self,
        new_galaxy: &NewGalaxy,
        new_guardians: &[NewGuardian],
    ) -> Result<GalaxyWithGuardians, DaoError> {
        if new_guardians.is_empty() {
            return Err(DaoError::CannotRunQuery(
                "A galaxy must be created with at least one guardian",
            ));
        }

        let mut db_connection = self.db_thread_pool.get()?;

        let created_galaxy = db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                let galaxy = dsl::insert_into(galaxies)
                    .values(new_galaxy)
                    .get_result::<Galaxy>(conn)?;

                let galaxy_guardians = dsl::insert_into(guardians)
                    .values(new_guardians)
                    .get_results::<Guardian>(conn)?;

                Ok(GalaxyWithGuardians {
                    galaxy,
                    guardians: galaxy_guardians,
                })
            })?;

        Ok(created_galaxy)
    }

    pub fn update_galaxy(
        &self,
        galaxy_id: Uuid,
        update: &GalaxyUpdate,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        if update.guardians.as_ref().is_some_and(|g| g.is_empty()) {
            return Err(DaoError::CannotRunQuery(
                "A galaxy's guardians cannot be replaced with an empty set",
            ));
        }

        let mut db_connection = self.db_thread_pool.get()?;

        let updated_galaxy = db_connection
            .build_transaction()
            .run::<_, diesel::result::Error, _>(|conn| {
                if let Some(recovery_address) = &update.recovery_address {
                    dsl::update(galaxies.find(galaxy_id))
                        .set(galaxy_fields::recovery_address.eq(recovery_address))
                        .execute(conn)?;
                }

                if let Some(new_guardians) = &update.guardians {
                    delete_guardians_by_galaxy_id(conn, galaxy_id)?;

                    dsl::insert_into(guardians)
                        .values(new_guardians)
                        .execute(conn)?;
                }

                let galaxy = dsl::update(galaxies.find(galaxy_id))
                    .set(galaxy_fields::updated_timestamp.eq(SystemTime::now()))
                    .get_result::<Galaxy>(conn)?;

                load_with_guardians(conn, galaxy)
            })?;

        Ok(updated_galaxy)
    }

    pub fn set_guardian_recovery_secret(
        &self,
        guardian_id: Uuid,
        recovery_secret: &str,
    ) -> Result<(), DaoError> {
        let affected_row_count = dsl::update(guardians.find(guardian_id))
            .set((
                guardian_fields::recovery_secret.eq(Some(recovery_secret)),
                guardian_fields::updated_timestamp.eq(SystemTime::now()),
            ))
            .execute(&mut self.db_thread_pool.get()?)?;

        if affected_row_count == 0 {
            return Err(DaoError::not_found());
        }

        Ok(())
    }
}

impl GalaxyStore for Dao {
    fn find_by_recovery_address(
        &self,
        recovery_address: &str,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        self.get_galaxy_by_recovery_address(recovery_address)
    }

    fn insert_galaxy(
        &self,
        new_galaxy: &NewGalaxy,
        new_guardians: &[NewGuardian],
    ) -> Result<GalaxyWithGuardians, DaoError> {
        self.create_galaxy(new_galaxy, new_guardians)
    }

    fn update_galaxy(
        &self,
        galaxy_id: Uuid,
        update: &GalaxyUpdate,
    ) -> Result<GalaxyWithGuardians, DaoError> {
        Dao::update_galaxy(self, galaxy_id, update)
    }

    fn set_recovery_secret(
        &self,
        guardian_id: Uuid,
        recovery_secret: &str,
    ) -> Result<(), DaoError> {
        self.set_guardian_recovery_secret(guardian_id, recovery_secret)
    }
}

fn delete_guardians_by_galaxy_id(conn: &mut PgConnection, galaxy_id: Uuid) -> QueryResult<usize> {
    diesel::delete(guardians.filter(guardian_fields::galaxy_id.eq(galaxy_id))).execute(conn)
}

fn load_with_guardians(
    conn: &mut PgConnection,
    galaxy: Galaxy,
) -> QueryResult<GalaxyWithGuardians> {
    let galaxy_guardians = Guardian::belonging_to(&galaxy)
        .order((
            guardian_fields::created_timestamp.asc(),
            guardian_fields::id.asc(),
        ))
        .load::<Guardian>(conn)?;

    Ok(GalaxyWithGuardians {
        galaxy,
        guardians: galaxy_guardians,
    })
}
