use crate::constants::FALLBACK_APP_NAME;
use std::fmt;
use std::str::FromStr;

/// Character filter applied to application names before they become folder names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SanitizePolicy {
    /// Keep ASCII letters, digits and spaces only.
    #[default]
    Alphanumeric,
    /// Drop characters that are not allowed in file names on common platforms.
    PathSafe,
}

impl SanitizePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SanitizePolicy::Alphanumeric => "alphanumeric",
            SanitizePolicy::PathSafe => "path_safe",
        }
    }

    fn keeps(self, c: char) -> bool {
        match self {
            SanitizePolicy::Alphanumeric => c.is_ascii_alphanumeric() || c == ' ',
            SanitizePolicy::PathSafe => {
                !c.is_control() && !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            }
        }
    }
}

impl fmt::Display for SanitizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SanitizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alphanumeric" => Ok(SanitizePolicy::Alphanumeric),
            "path_safe" | "path-safe" => Ok(SanitizePolicy::PathSafe),
            other => Err(format!("unknown sanitize policy '{other}'")),
        }
    }
}

/// Turn an application name into a folder name.
///
/// Disallowed characters are removed, surrounding whitespace is trimmed, and
/// an empty result becomes `"Other"`.
pub fn sanitize_app_name(name: &str, policy: SanitizePolicy) -> String {
    let filtered: String = name.chars().filter(|c| policy.keeps(*c)).collect();
    let trimmed = filtered.trim();

    if trimmed.is_empty() {
        FALLBACK_APP_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Display name derived from an executable file name: `.exe` and dots stripped.
pub fn executable_display_name(file_name: &str) -> String {
    file_name.replace(".exe", "").replace('.', "").trim().to_string()
}
