//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, CONFIG_FIELDS, Config};
use crate::error::CliError;
use crate::output;

/// One row of `config show`.
#[derive(Debug, Clone, Serialize, Tabled)]
struct FieldRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Explanation")]
    explanation: &'static str,
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Mask all but the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".into();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

fn field_rows(cfg: &Config, reveal: bool) -> Vec<FieldRow> {
    CONFIG_FIELDS
        .iter()
        .map(|field| {
            let raw = (field.get)(cfg).unwrap_or_default();
            let value = if field.secret && !reveal && !raw.is_empty() {
                mask(raw)
            } else {
                raw.to_owned()
            };
            FieldRow {
                name: field.name,
                value,
                explanation: field.help,
            }
        })
        .collect()
}

/// Read the file (not env overrides), apply one change and write it back.
fn update_field(name: &str, value: &str, global: &GlobalOpts) -> Result<(), CliError> {
    config::find_field(name)?;

    let path = config::config_path();
    let mut cfg = config::read_file_config(&path)?;
    cfg.set(name, value)?;
    config::save_config_to(&path, &cfg)?;

    tracing::debug!(field = name, path = %path.display(), "config updated");
    output::print_output("Successfully updated config file!", global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show { reveal } => {
            let cfg = config::load(global)?;
            let rows = field_rows(&cfg, reveal);
            let out = output::render_list(global.output, &rows, FieldRow::clone, |r| {
                format!("{}={}", r.name, r.value)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { name, value } => update_field(&name, &value, global),

        ConfigCommand::SetKey => {
            let key = rpassword::prompt_password("API key: ")?;
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Validation {
                    field: "key".into(),
                    reason: "API key cannot be empty".into(),
                });
            }
            update_field("key", key, global)
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_tail() {
        assert_eq!(mask("o.abcdefgh1234"), "****1234");
        assert_eq!(mask("abc"), "****");
    }

    #[test]
    fn rows_mask_secrets_unless_revealed() {
        let cfg = Config {
            key: Some("o.secretvalue".into()),
        };
        let masked = field_rows(&cfg, false);
        assert_eq!(masked[0].name, "key");
        assert_eq!(masked[0].value, "****alue");
        assert_eq!(masked[0].explanation, "Pushbullet API key");

        let revealed = field_rows(&cfg, true);
        assert_eq!(revealed[0].value, "o.secretvalue");

        let empty = field_rows(&Config::default(), false);
        assert_eq!(empty[0].value, "");
    }
}
