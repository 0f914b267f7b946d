use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use roster_core::config::{AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

/// `(key path, primary env var, alias env var)` for every reported setting.
const FIELDS: &[(&str, &str, Option<&str>)] = &[
    ("database.backend", "ROSTER_DATABASE_BACKEND", None),
    ("database.url", "ROSTER_DATABASE_URL", None),
    ("database.max_connections", "ROSTER_DATABASE_MAX_CONNECTIONS", None),
    ("database.timeout_secs", "ROSTER_DATABASE_TIMEOUT_SECS", None),
    ("server.bind_address", "ROSTER_SERVER_BIND_ADDRESS", None),
    ("server.port", "ROSTER_SERVER_PORT", None),
    ("server.graceful_shutdown_secs", "ROSTER_SERVER_GRACEFUL_SHUTDOWN_SECS", None),
    ("logging.level", "ROSTER_LOGGING_LEVEL", Some("ROSTER_LOG_LEVEL")),
    ("logging.format", "ROSTER_LOGGING_FORMAT", Some("ROSTER_LOG_FORMAT")),
];

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, env_key, alias) in FIELDS {
        lines.push(render_line(
            key_path,
            &effective_value(&config, key_path),
            field_source(
                key_path,
                &[Some(*env_key), *alias],
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        ));
    }

    CommandResult::success("config", lines.join("\n"))
}

fn effective_value(config: &AppConfig, key_path: &str) -> String {
    match key_path {
        "database.backend" => format!("{:?}", config.database.backend),
        "database.url" => config.database.url.clone(),
        "database.max_connections" => config.database.max_connections.to_string(),
        "database.timeout_secs" => config.database.timeout_secs.to_string(),
        "server.bind_address" => config.server.bind_address.clone(),
        "server.port" => config.server.port.to_string(),
        "server.graceful_shutdown_secs" => config.server.graceful_shutdown_secs.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.format" => format!("{:?}", config.logging.format),
        _ => "<unknown>".to_string(),
    }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("roster.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/roster.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[Option<&str>],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys.iter().flatten() {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_are_found_in_file_documents() {
        let doc: Value = "[database]\nurl = \"sqlite::memory:\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "database.url"));
        assert!(!contains_path(&doc, "database.backend"));
        assert!(!contains_path(&doc, "server.port"));
    }

    #[test]
    fn file_source_names_the_file_when_env_is_unset() {
        let doc: Value = "[server]\nport = 9090\n".parse().expect("toml");

        let source = field_source(
            "server.port",
            &[Some("ROSTER_TEST_UNSET_PORT_VARIABLE")],
            Some(&doc),
            Some(Path::new("roster.toml")),
        );
        let fallback = field_source("server.bind_address", &[None], Some(&doc), None);

        assert_eq!(source, "file (roster.toml)");
        assert_eq!(fallback, "default");
    }
}
