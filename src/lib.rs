#[macro_use]
extern crate rocket;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registration;
pub mod request_logger;
pub mod routes;
pub mod users;
pub mod validation;

use crate::auth::PasswordService;
use crate::auth::passwords::PasswordParams;
use crate::config::AppConfig;
use crate::db::RegistrationDb;
use crate::error::AppError;
use crate::registration::Registrar;
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};
use rocket_db_pools::Database;
use rocket_db_pools::sqlx::PgPool;
use rocket_dyn_templates::Template;
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::Once;

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

/// Build the registration service around an existing pool, with Argon2
/// costs taken from the environment.
pub fn build_registrar(pool: PgPool) -> Result<Registrar, AppError> {
    let passwords = PasswordService::with_params(PasswordParams::from_env())?;
    Ok(Registrar::new(pool, passwords)?)
}

pub fn rocket() -> Rocket<Build> {
    init_logger();

    let config = AppConfig::from_env();
    log::info!(
        "csrf cookie '{}' (secure: {}), redirecting registrations to {}",
        config.csrf_cookie_name,
        config.cookie_secure,
        config.success_redirect
    );

    rocket::build()
        .attach(RequestLogger)
        .attach(RegistrationDb::init())
        .attach(Template::fairing())
        .manage(config)
        // Run database migrations on startup
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match RegistrationDb::fetch(&rocket) {
                    Some(pool) => match db::run_migrations(pool).await {
                        Ok(_) => {
                            log::info!("database migrations successful");
                            Ok(rocket)
                        }
                        Err(e) => {
                            log::error!("database migrations failed: {}", e);
                            Err(rocket)
                        }
                    },
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        .attach(AdHoc::try_on_ignite(
            "Registration Service",
            |rocket| async move {
                let pool = match RegistrationDb::fetch(&rocket) {
                    Some(db) => (**db).clone(),
                    None => {
                        log::error!("database pool not available for registration service");
                        return Err(rocket);
                    }
                };

                match build_registrar(pool) {
                    Ok(registrar) => Ok(rocket.manage(registrar)),
                    Err(e) => {
                        log::error!("failed to initialize registration service: {}", e);
                        Err(rocket)
                    }
                }
            },
        ))
        .mount(
            "/",
            routes![
                routes::home::index,
                routes::user::register_form,
                routes::user::register,
            ],
        )
        .mount("/api/v1", openapi_get_routes![routes::health::health_check])
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .register("/", routes::catchers::catchers())
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use rocket_db_pools::sqlx::{self, PgPool};
    use rocket_dyn_templates::Template;

    use crate::auth::PasswordService;
    use crate::auth::passwords::PasswordParams;
    use crate::config::AppConfig;
    use crate::registration::Registrar;

    pub use database::{TestDatabase, TestDatabaseError};

    /// Convenience helpers for seeding and inspecting the `users` table in tests.
    pub struct TestFixtures<'a> {
        pool: &'a PgPool,
    }

    impl<'a> TestFixtures<'a> {
        /// Create a fixture helper bound to the provided pool.
        pub fn new(pool: &'a PgPool) -> Self {
            Self { pool }
        }

        /// Insert a user row directly, returning the new user id.
        pub async fn insert_user(
            &self,
            first_name: &str,
            last_name: &str,
            email_address: &str,
        ) -> Result<i32, sqlx::Error> {
            sqlx::query_scalar(
                "INSERT INTO users (first_name, last_name, email_address, hashed_password) VALUES ($1, $2, $3, $4) RETURNING id",
            )
            .bind(first_name)
            .bind(last_name)
            .bind(email_address)
            .bind("$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaA")
            .fetch_one(self.pool)
            .await
        }

        pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
            sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(self.pool)
                .await
        }
    }

    /// Argon2 costs low enough to keep integration tests fast.
    pub fn cheap_password_service() -> PasswordService {
        PasswordService::with_params(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("valid test argon2 params")
    }

    pub mod database {
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, PgPool};
        use testcontainers_modules::postgres::Postgres;
        use testcontainers_modules::testcontainers::{
            ContainerAsync, core::error::TestcontainersError, runners::AsyncRunner,
        };
        use thiserror::Error;
        use tokio::runtime::Handle;
        use uuid::Uuid;

        use crate::db::MIGRATOR;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("neither TEST_DATABASE_URL nor TEST_DATABASE_CONTAINER is set")]
            MissingUrl,
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Ephemeral, fully migrated database for integration tests.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            container: Option<ContainerAsync<Postgres>>,
        }

        impl TestDatabase {
            /// Provision a database on the server named by `TEST_DATABASE_URL`,
            /// or in a disposable container when `TEST_DATABASE_CONTAINER` is set.
            pub async fn new_from_env() -> Result<Self, TestDatabaseError> {
                if let Ok(url) = std::env::var("TEST_DATABASE_URL") {
                    return Self::provision(&url, None).await;
                }
                if std::env::var_os("TEST_DATABASE_CONTAINER").is_some() {
                    return Self::new().await;
                }
                Err(TestDatabaseError::MissingUrl)
            }

            /// Provision a fresh database inside a disposable Postgres container.
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let container = Postgres::default().start().await?;
                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let admin_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

                Self::provision(&admin_url, Some(container)).await
            }

            async fn provision(
                admin_url: &str,
                container: Option<ContainerAsync<Postgres>>,
            ) -> Result<Self, TestDatabaseError> {
                let base_options: PgConnectOptions =
                    admin_url.parse().map_err(TestDatabaseError::Sqlx)?;
                let base_options = base_options.log_statements(LevelFilter::Off);

                let base_name = base_options
                    .get_database()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "postgres".to_string());

                let admin_options = base_options.clone();
                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await?;

                let new_db_name = format!("{}_{}", base_name, Uuid::new_v4().simple());
                let create_sql = format!("CREATE DATABASE \"{}\" TEMPLATE template0", new_db_name);
                sqlx::query(&create_sql).execute(&admin_pool).await?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(base_options.database(&new_db_name))
                    .await?;

                MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    database_name: new_db_name,
                    container,
                })
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Close pool connections and drop the ephemeral database.
            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }

                drop_database(self.admin_options.clone(), &self.database_name).await?;
                self.container.take();

                Ok(())
            }
        }

        async fn drop_database(
            admin_options: PgConnectOptions,
            database_name: &str,
        ) -> Result<(), sqlx::Error> {
            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(admin_options)
                .await?;

            let drop_sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", database_name);
            sqlx::query(&drop_sql).execute(&admin_pool).await?;
            admin_pool.close().await;
            Ok(())
        }

        impl Drop for TestDatabase {
            fn drop(&mut self) {
                if let Some(pool) = self.pool.take() {
                    let admin_options = self.admin_options.clone();
                    let db_name = self.database_name.clone();
                    if let Ok(handle) = Handle::try_current() {
                        handle.spawn(async move {
                            pool.close().await;
                            let _ = drop_database(admin_options, &db_name).await;
                        });
                    }
                }
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        config: AppConfig,
        pg_pool: Option<PgPool>,
    }

    impl Default for TestRocketBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestRocketBuilder {
        /// Start a builder with test defaults: random port, logging disabled,
        /// non-secure cookies.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false))
                .merge(("template_dir", "templates"));

            Self {
                figment,
                mounts: Vec::new(),
                config: AppConfig {
                    cookie_secure: false,
                    ..AppConfig::default()
                },
                pg_pool: None,
            }
        }

        /// Mount HTML routes at the site root.
        pub fn mount_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/".to_string(), routes));
            self
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        pub fn with_config(mut self, config: AppConfig) -> Self {
            self.config = config;
            self
        }

        /// Manage a `PgPool` and a [`Registrar`] built on it.
        pub fn manage_pg_pool(mut self, pool: PgPool) -> Self {
            self.pg_pool = Some(pool);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment)
                .attach(Template::fairing())
                .manage(self.config)
                .register("/", crate::routes::catchers::catchers());

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(pool) = self.pg_pool {
                let registrar = Registrar::new(pool.clone(), cheap_password_service())
                    .expect("registration rules compile");
                rocket = rocket.manage(pool).manage(registrar);
            }

            rocket
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}
