use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Every variable is optional, so the empty map is the baseline.
fn empty_env<'a>() -> HashMap<&'a str, &'a str> {
    HashMap::new()
}

#[test]
fn parse_environment_accepts_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment(" Production ").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TIENDA_ENV"));
}

#[test]
fn build_app_config_defaults() {
    let map = empty_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.data_dir.to_str(), Some("./data"));
    assert_eq!(cfg.catalog_path.to_str(), Some("./config/catalog.yaml"));
    assert!((cfg.default_location.lat - -29.9027).abs() < f64::EPSILON);
    assert!((cfg.default_location.lng - -71.2519).abs() < f64::EPSILON);
    assert!(!cfg.chat.enabled);
    assert!(cfg.chat.api_key.is_none());
    assert_eq!(cfg.chat.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(cfg.chat.model, "meta-llama/llama-3.2-3b-instruct:free");
    assert_eq!(cfg.chat.max_tokens, 200);
    assert!((cfg.chat.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(cfg.chat.timeout_secs, 30);
    assert_eq!(cfg.chat.max_retries, 2);
    assert_eq!(cfg.chat.offer_limit, 20);
    assert_eq!(cfg.geocoder_url, "https://nominatim.openstreetmap.org");
    assert_eq!(cfg.geocoder_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "tienda/0.1 (hardware-marketplace)");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = empty_env();
    map.insert("TIENDA_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_BIND_ADDR"),
        "expected InvalidEnvVar(TIENDA_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_requires_api_key_when_chat_enabled() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_ENABLED", "true");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OPENROUTER_API_KEY"),
        "expected MissingEnvVar(OPENROUTER_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_blank_api_key_counts_as_missing() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_ENABLED", "1");
    map.insert("OPENROUTER_API_KEY", "   ");
    assert!(build_app_config(lookup_from_map(&map)).is_err());
}

#[test]
fn build_app_config_chat_enabled_with_key() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_ENABLED", "yes");
    map.insert("OPENROUTER_API_KEY", "sk-or-test");
    map.insert("TIENDA_CHAT_MODEL", "openai/gpt-4o-mini");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.chat.enabled);
    assert_eq!(cfg.chat.api_key.as_deref(), Some("sk-or-test"));
    assert_eq!(cfg.chat.model, "openai/gpt-4o-mini");
}

#[test]
fn build_app_config_invalid_bool() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_ENABLED", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_CHAT_ENABLED"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_out_of_range_default_location() {
    let mut map = empty_env();
    map.insert("TIENDA_DEFAULT_LAT", "123.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_DEFAULT_LAT"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_names_out_of_range_longitude() {
    let mut map = empty_env();
    map.insert("TIENDA_DEFAULT_LNG", "-200.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_DEFAULT_LNG"),
        "got: {result:?}"
    );

    map.insert("TIENDA_DEFAULT_LAT", "95.0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_DEFAULT_LAT"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_default_location_override() {
    let mut map = empty_env();
    map.insert("TIENDA_DEFAULT_LAT", "-33.4489");
    map.insert("TIENDA_DEFAULT_LNG", "-70.6693");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.default_location.lat - -33.4489).abs() < f64::EPSILON);
    assert!((cfg.default_location.lng - -70.6693).abs() < f64::EPSILON);
}

#[test]
fn build_app_config_temperature_out_of_range() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_TEMPERATURE", "3.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_CHAT_TEMPERATURE"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_max_retries_invalid() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_MAX_RETRIES", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TIENDA_CHAT_MAX_RETRIES"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_timeouts_override() {
    let mut map = empty_env();
    map.insert("TIENDA_CHAT_TIMEOUT_SECS", "5");
    map.insert("TIENDA_GEOCODER_TIMEOUT_SECS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.chat.timeout_secs, 5);
    assert_eq!(cfg.geocoder_timeout_secs, 3);
}

#[test]
fn chat_config_debug_redacts_api_key() {
    let mut map = empty_env();
    map.insert("OPENROUTER_API_KEY", "sk-or-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-or-secret"));
    assert!(rendered.contains("[redacted]"));
}
