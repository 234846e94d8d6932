use std::env;
use std::fs;
use std::path::Path;

use lexbook_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

fn field(key: &'static str, value: impl ToString, env_keys: &'static [&'static str]) -> Field {
    Field { key, value: value.to_string(), env_keys }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(effective_fields(&config).into_iter().map(|field| {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        render_line(field.key, &field.value, source)
    }));

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    let api_key = config
        .llm
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        field("database.url", &config.database.url, &["LEXBOOK_DATABASE_URL"]),
        field(
            "database.max_connections",
            config.database.max_connections,
            &["LEXBOOK_DATABASE_MAX_CONNECTIONS"],
        ),
        field(
            "database.timeout_secs",
            config.database.timeout_secs,
            &["LEXBOOK_DATABASE_TIMEOUT_SECS"],
        ),
        field("llm.provider", config.llm.provider.as_str(), &["LEXBOOK_LLM_PROVIDER"]),
        field("llm.api_key", api_key, &["LEXBOOK_LLM_API_KEY"]),
        field(
            "llm.base_url",
            config.llm.base_url.as_deref().unwrap_or("<unset>"),
            &["LEXBOOK_LLM_BASE_URL"],
        ),
        field("llm.model", &config.llm.model, &["LEXBOOK_LLM_MODEL"]),
        field("llm.timeout_secs", config.llm.timeout_secs, &["LEXBOOK_LLM_TIMEOUT_SECS"]),
        field("llm.max_retries", config.llm.max_retries, &["LEXBOOK_LLM_MAX_RETRIES"]),
        field(
            "availability.provider",
            config.availability.provider.as_str(),
            &["LEXBOOK_AVAILABILITY_PROVIDER"],
        ),
        field(
            "availability.calendar_base_url",
            config.availability.calendar_base_url.as_deref().unwrap_or("<unset>"),
            &["LEXBOOK_AVAILABILITY_CALENDAR_BASE_URL"],
        ),
        field(
            "availability.timeout_secs",
            config.availability.timeout_secs,
            &["LEXBOOK_AVAILABILITY_TIMEOUT_SECS"],
        ),
        field(
            "booking.booking_id_prefix",
            &config.booking.booking_id_prefix,
            &["LEXBOOK_BOOKING_ID_PREFIX"],
        ),
        field(
            "booking.office_location",
            &config.booking.office_location,
            &["LEXBOOK_BOOKING_OFFICE_LOCATION"],
        ),
        field(
            "booking.meeting_link_base",
            &config.booking.meeting_link_base,
            &["LEXBOOK_BOOKING_MEETING_LINK_BASE"],
        ),
        field(
            "booking.search_window_days",
            config.booking.search_window_days,
            &["LEXBOOK_BOOKING_SEARCH_WINDOW_DAYS"],
        ),
        field(
            "booking.preview_slots",
            config.booking.preview_slots,
            &["LEXBOOK_BOOKING_PREVIEW_SLOTS"],
        ),
        field(
            "server.bind_address",
            &config.server.bind_address,
            &["LEXBOOK_SERVER_BIND_ADDRESS"],
        ),
        field("server.port", config.server.port, &["LEXBOOK_SERVER_PORT"]),
        field(
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs,
            &["LEXBOOK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        field(
            "logging.level",
            &config.logging.level,
            &["LEXBOOK_LOGGING_LEVEL", "LEXBOOK_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            config.logging.format.as_str(),
            &["LEXBOOK_LOGGING_FORMAT", "LEXBOOK_LOG_FORMAT"],
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
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

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_keep_only_their_prefix() {
        assert_eq!(redact_secret("sk-live-abcdef"), "sk-***");
        assert_eq!(redact_secret("plainsecret"), "<redacted>");
        assert_eq!(redact_secret("  "), "<empty>");
    }

    #[test]
    fn nested_keys_are_found_in_config_documents() {
        let doc: toml::Value = "[booking]\npreview_slots = 2\n".parse().expect("toml");

        assert!(contains_path(&doc, "booking.preview_slots"));
        assert!(!contains_path(&doc, "booking.search_window_days"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
