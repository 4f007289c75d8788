//! Print an argon2 hash for the admin password
//!
//! Usage: `hash-password <password>`

use anyhow::{Context, Result};
use site_api::session::hash_password;

fn main() -> Result<()> {
    let password = std::env::args()
        .nth(1)
        .context("usage: hash-password <password>")?;

    let hash = hash_password(&password)?;

    println!("Hash: {}", hash);
    println!();
    println!("Add this to your environment:");
    println!("SITE_API__ADMIN__PASSWORD_HASH='{}'", hash);
    Ok(())
}
