//! Seed the database with products and demo users.

use std::path::Path;

use tracing::info;

use storechat_core::Email;
use storechat_server::db::{ChatStore, PgStore};
use storechat_server::models::NewUser;

use crate::catalogue::{parse_catalogue, sample_catalogue};

/// Users created by `seed users`.
const DEMO_USERS: [(&str, &str); 2] = [
    ("demo_user", "demo@example.com"),
    ("test_user", "test@example.com"),
];

/// Insert products from `file`, or the sample catalogue when no file is given.
///
/// The sample catalogue is skipped if the table already has products.
///
/// # Errors
///
/// Returns an error if the file can't be read or parsed, or an insert fails.
pub async fn products(file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // Parse before connecting so a bad file fails fast.
    let products = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading products from file");
            let text = tokio::fs::read_to_string(path).await?;
            Some(parse_catalogue(&text)?)
        }
        None => None,
    };

    let store = PgStore::new(super::connect().await?);

    let products = match products {
        Some(products) => products,
        None => {
            if store.stats().await?.products > 0 {
                info!("Products already present, skipping sample catalogue");
                return Ok(());
            }
            info!("No file given, inserting sample catalogue");
            sample_catalogue()
        }
    };

    let total = products.len();
    for product in products {
        store.create_product(product).await?;
    }

    info!(inserted = total, "Product seeding complete");
    Ok(())
}

/// Create the demo users if they don't already exist.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub async fn users() -> Result<(), Box<dyn std::error::Error>> {
    let store = PgStore::new(super::connect().await?);

    for (username, email) in DEMO_USERS {
        let email = Email::parse(email)?;
        if let Some(existing) = store.get_user_by_email(&email).await? {
            info!(user_id = %existing.id, %username, "User already exists");
            continue;
        }

        let user = store.create_user(NewUser::demo(username, email)).await?;
        info!(user_id = %user.id, %username, "Created user");
    }

    Ok(())
}
