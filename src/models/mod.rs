pub mod settings;

pub use settings::{SettingKey, Settings};
