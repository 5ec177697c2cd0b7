use rocket_db_pools::sqlx::{self, PgPool};
use rocket_db_pools::Database;

#[derive(Database)]
#[database("registration_db")]
pub struct RegistrationDb(sqlx::PgPool);

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply any pending migrations before the server starts taking requests.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("checking database migration state");
    MIGRATOR.run(pool).await?;
    log::info!("database migrations up to date");
    Ok(())
}
