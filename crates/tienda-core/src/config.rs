use crate::app_config::{AppConfig, ChatConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid, or if chat is enabled without
/// an API key.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from the variables already in the process.
///
/// Does not read `.env` files.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let env = parse_environment(&or_default("TIENDA_ENV", "development"))?;

    let bind_addr = or_default("TIENDA_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TIENDA_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("TIENDA_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("TIENDA_DATA_DIR", "./data"));
    let catalog_path = PathBuf::from(or_default("TIENDA_CATALOG_PATH", "./config/catalog.yaml"));

    let default_lat = parse_f64("TIENDA_DEFAULT_LAT", "-29.9027")?;
    let default_lng = parse_f64("TIENDA_DEFAULT_LNG", "-71.2519")?;
    // Latitude alone first, so the error names the variable that is out of range.
    Coordinate::new(default_lat, 0.0).map_err(|e| invalid("TIENDA_DEFAULT_LAT", e.to_string()))?;
    let default_location = Coordinate::new(default_lat, default_lng)
        .map_err(|e| invalid("TIENDA_DEFAULT_LNG", e.to_string()))?;

    let chat_enabled = parse_bool("TIENDA_CHAT_ENABLED", "false")?;
    let api_key = lookup("OPENROUTER_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    if chat_enabled && api_key.is_none() {
        return Err(ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()));
    }

    let temperature_raw = or_default("TIENDA_CHAT_TEMPERATURE", "0.7");
    let temperature = temperature_raw
        .parse::<f32>()
        .map_err(|e| invalid("TIENDA_CHAT_TEMPERATURE", e.to_string()))?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(
            "TIENDA_CHAT_TEMPERATURE",
            format!("must be between 0 and 2, got {temperature_raw}"),
        ));
    }

    let offer_limit = or_default("TIENDA_CHAT_OFFER_LIMIT", "20")
        .parse::<usize>()
        .map_err(|e| invalid("TIENDA_CHAT_OFFER_LIMIT", e.to_string()))?;

    let chat = ChatConfig {
        enabled: chat_enabled,
        api_key,
        base_url: or_default("TIENDA_CHAT_BASE_URL", "https://openrouter.ai/api/v1"),
        model: or_default("TIENDA_CHAT_MODEL", "meta-llama/llama-3.2-3b-instruct:free"),
        max_tokens: parse_u32("TIENDA_CHAT_MAX_TOKENS", "200")?,
        temperature,
        timeout_secs: parse_u64("TIENDA_CHAT_TIMEOUT_SECS", "30")?,
        max_retries: parse_u32("TIENDA_CHAT_MAX_RETRIES", "2")?,
        offer_limit,
        referer: or_default("TIENDA_CHAT_REFERER", "http://localhost:3000"),
    };

    let geocoder_url = or_default("TIENDA_GEOCODER_URL", "https://nominatim.openstreetmap.org");
    let geocoder_timeout_secs = parse_u64("TIENDA_GEOCODER_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("TIENDA_USER_AGENT", "tienda/0.1 (hardware-marketplace)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        catalog_path,
        default_location,
        chat,
        geocoder_url,
        geocoder_timeout_secs,
        user_agent,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TIENDA_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
