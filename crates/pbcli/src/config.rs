//! CLI configuration: thin wrapper around `pbcli_config`.
//!
//! Adds `GlobalOpts`-aware resolution on top of the shared crate
//! (`--api-key`, `--api-url`, `--stream-url`, `--timeout`).

use std::time::Duration;

use url::Url;

use pbcli_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use pbcli_config::{
    CONFIG_FIELDS, Config, config_path, find_field, read_file_config, save_config_to,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Load the config, creating an empty file on first run.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let loaded = pbcli_config::load_or_init()?;
    if loaded.created && !global.quiet {
        eprintln!("Config file does not exist... creating");
    }
    tracing::debug!(path = %loaded.path.display(), "loaded config");
    Ok(loaded.config)
}

/// Build the core client config from the loaded config and global flags.
///
/// Flag values take priority over the file.
pub fn client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let mut client = pbcli_config::client_config(cfg, global.api_key.as_deref())?
        .with_timeout(Duration::from_secs(global.timeout));

    if let Some(ref raw) = global.api_url {
        client = client.with_api_url(parse_url("api-url", raw)?);
    }
    if let Some(ref raw) = global.stream_url {
        client = client.with_stream_url(parse_url("stream-url", raw)?);
    }
    Ok(client)
}

fn parse_url(field: &str, raw: &str) -> Result<Url, CliError> {
    Url::parse(raw).map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL {raw}: {e}"),
    })
}
