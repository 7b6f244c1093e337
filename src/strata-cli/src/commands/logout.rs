//! The `logout` command.

use anyhow::Context;

use strata_connection::ConnectionProfile;

use crate::factory;

pub async fn run() -> anyhow::Result<()> {
    let store = factory::config_store()?;
    let outcome =
        factory::build_connection(store, ConnectionProfile::SKIP_SECONDARY_AUTH).await?;

    // A failed refresh is not fatal here: logout only needs the stored
    // refresh tokens, which it still has.
    if let Some(err) = outcome.refresh_error {
        tracing::debug!(error = %err, "continuing logout despite refresh failure");
    }
    let mut connection = outcome.connection;

    connection
        .logout()
        .await
        .context("unable to log out; your session is unchanged")?;

    println!("Logged out.");
    Ok(())
}
