//! Create or promote the account that holds the Ruler role.
//!
//! Usage: `RULER_PASSWORD=... create-ruler <email> <first-name> <last-name>`
//!
//! An existing account with the email is promoted, verified and reactivated;
//! its password is left unchanged. The Ruler role cannot be granted through
//! the HTTP API.

use anyhow::{bail, Context, Result};

use palace_server::auth::password::hash_password;
use palace_server::db::{self, NewUser};
use palace_server::permissions::Role;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_ruler=info,palace_server=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(first_name), Some(last_name)) = (args.next(), args.next(), args.next())
    else {
        bail!("Usage: RULER_PASSWORD=<password> create-ruler <email> <first-name> <last-name>");
    };

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let mut tx = pool.begin().await?;

    let existing: Option<uuid::Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE LOWER(email) = LOWER($1) FOR UPDATE")
            .bind(email.trim())
            .fetch_optional(&mut *tx)
            .await?;

    let user = match existing {
        Some(id) => {
            sqlx::query("UPDATE users SET is_verified = TRUE, is_active = TRUE WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            db::update_user_role(&mut *tx, id, Role::Ruler)
                .await?
                .context("account disappeared during promotion")?
        }
        None => {
            let password = std::env::var("RULER_PASSWORD")
                .context("RULER_PASSWORD must be set to create a new account")?;
            if password.chars().count() < 8 {
                bail!("RULER_PASSWORD must be at least 8 characters");
            }
            let password_hash = hash_password(&password).context("failed to hash password")?;

            db::create_user(
                &mut *tx,
                &NewUser {
                    email: &email,
                    password_hash: &password_hash,
                    first_name: &first_name,
                    last_name: &last_name,
                    phone_number: "",
                    village: "",
                    ward: "",
                    role: Role::Ruler,
                    is_verified: true,
                },
            )
            .await?
        }
    };

    tx.commit().await?;

    tracing::info!(user_id = %user.id, email = %user.email, promoted = existing.is_some(), "Ruler account ready");
    println!("{} now holds the Ruler role ({})", user.display_name(), user.id);

    Ok(())
}
