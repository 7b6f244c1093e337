//! Launching the user's browser for the authorization URL.

use anyhow::{Context, Result};

/// Try to open `url` in the default browser.
///
/// Only http/https URLs are accepted, and the URL is passed as a single
/// argument, never through a shell. Callers fall back to printing the
/// URL when this fails.
pub fn open_in_browser(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).context("invalid URL")?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => anyhow::bail!("refusing to open URL with scheme '{scheme}'"),
    }
    let safe_url = parsed.as_str();

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg("--")
            .arg(safe_url)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(safe_url)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", safe_url])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
