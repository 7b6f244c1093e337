//! The `status` command: connection state and selected service contexts.

use crate::defaults;
use crate::factory;

pub fn run() -> anyhow::Result<()> {
    let store = factory::config_store()?;
    let config = factory::load_config(&store)?;

    let api_url = if config.api_url.is_empty() {
        defaults::PRODUCTION_API_URL
    } else {
        &config.api_url
    };

    println!("API gateway:     {api_url}");
    println!(
        "Primary realm:   {}",
        realm_state(config.tokens.is_empty(), &config.auth_url)
    );
    println!(
        "Secondary realm: {}",
        realm_state(config.secondary_tokens.is_empty(), &config.secondary_auth_url)
    );

    match &config.streams {
        Some(streams) => println!("Stream instance: {}", streams.instance_id),
        None => println!("Stream instance: none selected"),
    }
    match &config.registry {
        Some(registry) if !registry.name.is_empty() => {
            println!("Registry:        {} ({})", registry.name, registry.instance_id)
        }
        Some(registry) => println!("Registry:        {}", registry.instance_id),
        None => println!("Registry:        none selected"),
    }

    if config.insecure {
        println!("TLS:             verification disabled");
    }

    Ok(())
}

fn realm_state(unauthenticated: bool, auth_url: &str) -> String {
    if unauthenticated {
        "not logged in".to_string()
    } else if auth_url.is_empty() {
        "logged in".to_string()
    } else {
        format!("logged in ({auth_url})")
    }
}
