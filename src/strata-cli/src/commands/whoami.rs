//! The `whoami` command.

use anyhow::bail;

use strata_login::token;

use crate::factory;

pub fn run() -> anyhow::Result<()> {
    let store = factory::config_store()?;
    let config = factory::load_config(&store)?;

    if config.tokens.is_empty() {
        bail!("not logged in, run 'strata login'");
    }

    match token::username(&config.tokens.access_token) {
        Some(username) => println!("{username}"),
        None => println!("unable to determine the logged-in user"),
    }
    Ok(())
}
