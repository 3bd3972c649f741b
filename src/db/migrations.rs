use super::schema::SCHEMA;
use crate::models::settings::SettingKey;
use rusqlite::{params, Connection, Result};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    seed_default_settings(conn)?;
    Ok(())
}

/// Insert the default value of every known key that has no row yet.
fn seed_default_settings(conn: &Connection) -> Result<()> {
    for key in SettingKey::ALL {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key.as_str(), key.default_value()],
        )?;
    }
    Ok(())
}
