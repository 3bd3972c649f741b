use crate::constants::*;
use crate::error::AppError;
use url::Url;

/// Parse a number of seconds.
pub fn parse_seconds(field: &'static str, value: &str) -> Result<f64, AppError> {
    let secs: f64 = value.trim().parse().map_err(|_| AppError::InvalidInput {
        field,
        reason: format!("'{}' is not a number", value.trim()),
    })?;
    if !secs.is_finite() {
        return Err(AppError::InvalidInput {
            field,
            reason: "must be a finite number".into(),
        });
    }
    Ok(secs)
}

/// Parse a boolean setting value.
pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::InvalidInput {
            field,
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}

fn validate_range(field: &'static str, secs: f64, min: f64, max: f64) -> Result<f64, AppError> {
    if !(min..=max).contains(&secs) {
        return Err(AppError::InvalidInput {
            field,
            reason: format!("must be between {min} and {max} seconds"),
        });
    }
    Ok(secs)
}

/// Validate the poll interval in seconds.
pub fn validate_refresh_interval(secs: f64) -> Result<f64, AppError> {
    validate_range(
        "refresh_interval",
        secs,
        MIN_REFRESH_INTERVAL_SECS,
        MAX_REFRESH_INTERVAL_SECS,
    )
}

/// Validate the toast duration in seconds.
pub fn validate_toast_duration(secs: f64) -> Result<f64, AppError> {
    validate_range(
        "toast_duration",
        secs,
        MIN_TOAST_DURATION_SECS,
        MAX_TOAST_DURATION_SECS,
    )
}

/// Validate an obs-websocket endpoint (`ws://` with a host).
pub fn validate_obs_url(value: &str) -> Result<Url, AppError> {
    let err = |reason: String| AppError::InvalidInput {
        field: "obs_url",
        reason,
    };

    let url = Url::parse(value.trim()).map_err(|e| err(e.to_string()))?;
    if url.scheme() != "ws" {
        return Err(err(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(err("missing host".into()));
    }
    Ok(url)
}

/// Validate a scene or profile name. Blank means "not configured".
///
/// Non-blank names are kept verbatim: host names may carry surrounding spaces.
pub fn validate_optional_name(field: &'static str, value: &str) -> Result<Option<String>, AppError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    if value.chars().any(char::is_control) {
        return Err(AppError::InvalidInput {
            field,
            reason: "cannot contain control characters".into(),
        });
    }
    Ok(Some(value.to_string()))
}
