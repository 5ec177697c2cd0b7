use std::io::{self, Write};

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use registration_server::build_registrar;
use registration_server::db::run_migrations;
use registration_server::models::RegistrationForm;
use registration_server::registration::RegistrationOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "create_user",
    about = "Register a user account from the command line, applying the same rules as the web form"
)]
struct Args {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    /// Email address; normalized before it is checked and stored.
    #[arg(long)]
    email: String,

    /// Plaintext password to hash and store for this user.
    #[arg(long)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;
    run_migrations(&pool).await?;

    let registrar = build_registrar(pool)?;
    let form = RegistrationForm {
        first_name: Some(args.first_name),
        last_name: Some(args.last_name),
        email_address: Some(args.email),
        confirm_password: Some(args.password.clone()),
        password: Some(args.password),
        csrf_token: None,
    };

    match registrar.register(form).await? {
        RegistrationOutcome::Created(user) => {
            println!(
                "Created user '{}' with id {}",
                user.email_address, user.id
            );
            Ok(())
        }
        RegistrationOutcome::Rejected { errors, .. } => {
            let mut stderr = io::stderr();
            for error in errors {
                writeln!(stderr, "error: {error}")?;
            }
            std::process::exit(1);
        }
    }
}
