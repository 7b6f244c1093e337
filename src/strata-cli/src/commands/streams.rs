//! The `streams` commands.

use anyhow::{Context, bail};
use url::Url;

use strata_connection::ConnectionProfile;

use crate::factory;

pub async fn list() -> anyhow::Result<()> {
    let store = factory::config_store()?;
    let outcome =
        factory::build_connection(store, ConnectionProfile::SKIP_SECONDARY_AUTH).await?;
    let connection = factory::require_fresh_tokens(outcome)?;

    let instances = connection.api().streams().list().await?;
    if instances.is_empty() {
        println!("No stream instances found.");
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

pub async fn topics(id: &str) -> anyhow::Result<()> {
    let store = factory::config_store()?;
    // Instance admin endpoints authenticate against the secondary realm.
    let outcome = factory::build_connection(store, ConnectionProfile::DEFAULT).await?;
    let connection = factory::require_fresh_tokens(outcome)?;

    let api = connection.api();
    let instance = api
        .streams()
        .get(id)
        .await
        .with_context(|| format!("could not look up stream instance '{id}'"))?;

    let Some(admin_api_url) = instance.admin_api_url else {
        bail!("stream instance '{id}' does not expose an admin API yet");
    };
    let admin_api_url = Url::parse(&admin_api_url)
        .with_context(|| format!("instance '{id}' reports an invalid admin API URL"))?;

    let topics = api.instance_admin(admin_api_url).topics().await?;
    if topics.is_empty() {
        println!("No topics in '{}'.", instance.name);
        return Ok(());
    }

    println!("{:<40} {}", "NAME", "PARTITIONS");
    for topic in topics {
        println!("{:<40} {}", topic.name, topic.partitions);
    }
    Ok(())
}
