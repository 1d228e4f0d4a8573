//! Config file loading and the sample-config generator.

use anyhow::{Context, Result};
use ferry_core::ClientConfig;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::path::Path;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ferry.toml";

/// Load configuration from the given TOML file, with `FERRY_`-prefixed
/// environment variables overriding file values.
pub fn load_config(path: &Path) -> Result<ClientConfig> {
    let config: ClientConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("FERRY_"))
        .extract()
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Write a placeholder config for the user to fill in.
pub async fn write_sample_config(path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(&ClientConfig::sample())?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    // The file will hold the worker secret; keep it private.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(path, perms).await?;
    }

    Ok(())
}

/// Render a byte count for display.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
