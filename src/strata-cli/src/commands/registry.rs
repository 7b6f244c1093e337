//! The `registry` commands.

use strata_connection::ConnectionProfile;

use crate::factory;

pub async fn list() -> anyhow::Result<()> {
    let store = factory::config_store()?;
    let outcome =
        factory::build_connection(store, ConnectionProfile::SKIP_SECONDARY_AUTH).await?;
    let connection = factory::require_fresh_tokens(outcome)?;

    let instances = connection.api().registry().list().await?;
    if instances.is_empty() {
        println!("No registry instances found.");
        return Ok(());
    }

    println!("{:<20} {:<28} {}", "ID", "NAME", "STATUS");
    for instance in instances {
        println!(
            "{:<20} {:<28} {}",
            instance.id, instance.name, instance.status
        );
    }
    Ok(())
}
