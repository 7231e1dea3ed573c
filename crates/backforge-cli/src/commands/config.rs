//! `backforge config`: inspect the effective configuration.

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            output.json(&value)?;
            output.data(&display_value(&value))?;
        }

        ConfigCommands::List => {
            output.json(&config.to_json()?)?;
            output.data(config.to_toml()?.trim_end())?;
        }

        ConfigCommands::Path => {
            output.data(&AppConfig::config_path().display().to_string())?;
        }
    }

    Ok(())
}

/// Strings print bare; lists join with commas; tables print as JSON.
fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strings_print_without_quotes() {
        let config = AppConfig::default();
        assert_eq!(display_value(&config.get("defaults.language").unwrap()), "typescript");
    }

    #[test]
    fn lists_join_with_commas() {
        assert_eq!(display_value(&json!(["cors", "request-logging"])), "cors,request-logging");
    }

    #[test]
    fn scalars_use_json_text() {
        assert_eq!(display_value(&json!(false)), "false");
        assert_eq!(display_value(&json!({"no_color": true})), r#"{"no_color":true}"#);
    }
}
