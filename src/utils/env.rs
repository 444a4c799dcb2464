/// Get environment variable with HUBHOOK_ prefix, falling back to unprefixed version
///
/// Checks `HUBHOOK_{key}` first, then `{key}`, so deployments can either
/// namespace their settings or reuse the platform's names (e.g. `PORT`).
///
/// # Examples
///
/// ```rust
/// use hubhook::utils::get_env_with_prefix;
///
/// // Checks HUBHOOK_PORT first, then PORT
/// let port = get_env_with_prefix("PORT");
/// ```
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("HUBHOOK_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}

/// Parse a boolean setting, accepting `true/false`, `1/0`, `yes/no` and `on/off`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
