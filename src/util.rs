const API_URL: &str = "SENSOR_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:8001";

pub fn get_default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

/// Backend URL from the environment, if set
pub fn get_api_url_override() -> Option<String> {
    std::env::var(API_URL)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

/// Coerce operator text into a threshold
///
/// Parses the longest leading numeric prefix, so `"30"`, `" 30.5 "` and
/// `"30°C"` all yield a number. Text without a numeric prefix becomes `NaN`;
/// it is not rejected here and the backend decides what to do with it.
pub fn coerce_threshold(input: &str) -> f64 {
    let trimmed = input.trim_start();

    let candidate_len = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    (1..=candidate_len)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
