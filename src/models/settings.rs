use crate::constants::*;
use crate::error::AppError;
use crate::sanitize::SanitizePolicy;
use crate::validation::{
    parse_bool, parse_seconds, validate_obs_url, validate_optional_name, validate_refresh_interval,
    validate_toast_duration,
};
use log::warn;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Persisted configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Scene,
    Profile,
    RefreshInterval,
    ToastDuration,
    Enabled,
    EnableNotif,
    SanitizePolicy,
    ObsUrl,
    ObsPassword,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        SettingKey::Scene,
        SettingKey::Profile,
        SettingKey::RefreshInterval,
        SettingKey::ToastDuration,
        SettingKey::Enabled,
        SettingKey::EnableNotif,
        SettingKey::SanitizePolicy,
        SettingKey::ObsUrl,
        SettingKey::ObsPassword,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Scene => "scene",
            SettingKey::Profile => "profile",
            SettingKey::RefreshInterval => "refresh_interval",
            SettingKey::ToastDuration => "toast_duration",
            SettingKey::Enabled => "enabled",
            SettingKey::EnableNotif => "enable_notif",
            SettingKey::SanitizePolicy => "sanitize_policy",
            SettingKey::ObsUrl => "obs_url",
            SettingKey::ObsPassword => "obs_password",
        }
    }

    /// Stored form of the default value.
    pub fn default_value(self) -> String {
        match self {
            SettingKey::Scene | SettingKey::Profile | SettingKey::ObsPassword => String::new(),
            SettingKey::RefreshInterval => DEFAULT_REFRESH_INTERVAL_SECS.to_string(),
            SettingKey::ToastDuration => DEFAULT_TOAST_DURATION_SECS.to_string(),
            SettingKey::Enabled | SettingKey::EnableNotif => "true".to_string(),
            SettingKey::SanitizePolicy => SanitizePolicy::default().as_str().to_string(),
            SettingKey::ObsUrl => DEFAULT_OBS_URL.to_string(),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| AppError::UnknownSetting { key: s.trim().to_string() })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    /// Scene the buffer is restricted to; `None` means any scene.
    pub scene: Option<String>,
    /// Profile to switch to while the buffer runs; `None` means no switch.
    pub profile: Option<String>,
    pub refresh_interval_secs: f64,
    pub toast_duration_secs: f64,
    pub notify_on_save: bool,
    pub sanitize_policy: SanitizePolicy,
    pub obs_url: String,
    pub obs_password: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            scene: None,
            profile: None,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            toast_duration_secs: DEFAULT_TOAST_DURATION_SECS,
            notify_on_save: true,
            sanitize_policy: SanitizePolicy::default(),
            obs_url: DEFAULT_OBS_URL.to_string(),
            obs_password: None,
        }
    }
}

impl Settings {
    /// Load settings, keeping the default for any missing or unparsable value.
    pub fn load(conn: &Connection) -> rusqlite::Result<Self> {
        let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
        let rows: HashMap<String, String> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<_>>()?;

        let mut settings = Self::default();
        for key in SettingKey::ALL {
            let Some(value) = rows.get(key.as_str()) else {
                continue;
            };
            if let Err(e) = settings.apply(key, value) {
                warn!("Ignoring stored value for '{key}': {e}");
            }
        }
        Ok(settings)
    }

    /// Validate `value` and store it under `key`.
    pub fn set(conn: &Connection, key: SettingKey, value: &str) -> Result<Self, AppError> {
        let mut settings = Self::load(conn)?;
        settings.apply(key, value)?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key.as_str(), settings.stored_value(key)],
        )?;
        Ok(settings)
    }

    /// Write every key back to the store.
    pub fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        for key in SettingKey::ALL {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key.as_str(), self.stored_value(key)],
            )?;
        }
        Ok(())
    }

    /// Restore every key to its default.
    pub fn reset(conn: &Connection) -> rusqlite::Result<Self> {
        let settings = Self::default();
        settings.save(conn)?;
        Ok(settings)
    }

    fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), AppError> {
        match key {
            SettingKey::Scene => self.scene = validate_optional_name("scene", value)?,
            SettingKey::Profile => self.profile = validate_optional_name("profile", value)?,
            SettingKey::RefreshInterval => {
                self.refresh_interval_secs =
                    validate_refresh_interval(parse_seconds("refresh_interval", value)?)?;
            }
            SettingKey::ToastDuration => {
                self.toast_duration_secs =
                    validate_toast_duration(parse_seconds("toast_duration", value)?)?;
            }
            SettingKey::Enabled => self.enabled = parse_bool("enabled", value)?,
            SettingKey::EnableNotif => self.notify_on_save = parse_bool("enable_notif", value)?,
            SettingKey::SanitizePolicy => {
                self.sanitize_policy = value.parse().map_err(|reason| AppError::InvalidInput {
                    field: "sanitize_policy",
                    reason,
                })?;
            }
            SettingKey::ObsUrl => {
                validate_obs_url(value)?;
                self.obs_url = value.trim().to_string();
            }
            SettingKey::ObsPassword => {
                self.obs_password = Some(value.to_string()).filter(|p| !p.is_empty());
            }
        }
        Ok(())
    }

    /// Stored form of the current value of `key`.
    pub fn stored_value(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Scene => self.scene.clone().unwrap_or_default(),
            SettingKey::Profile => self.profile.clone().unwrap_or_default(),
            SettingKey::RefreshInterval => self.refresh_interval_secs.to_string(),
            SettingKey::ToastDuration => self.toast_duration_secs.to_string(),
            SettingKey::Enabled => self.enabled.to_string(),
            SettingKey::EnableNotif => self.notify_on_save.to_string(),
            SettingKey::SanitizePolicy => self.sanitize_policy.as_str().to_string(),
            SettingKey::ObsUrl => self.obs_url.clone(),
            SettingKey::ObsPassword => self.obs_password.clone().unwrap_or_default(),
        }
    }

    /// Key/value pairs for display, with the password masked.
    pub fn display_entries(&self) -> Vec<(SettingKey, String)> {
        SettingKey::ALL
            .into_iter()
            .map(|key| {
                let value = if key == SettingKey::ObsPassword && self.obs_password.is_some() {
                    "********".to_string()
                } else {
                    self.stored_value(key)
                };
                (key, value)
            })
            .collect()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.refresh_interval_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_REFRESH_INTERVAL_SECS))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.toast_duration_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TOAST_DURATION_SECS))
    }
}
