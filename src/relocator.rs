use crate::constants::REPLAYS_DIR;
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelocateError {
    #[error("Host reported no saved replay path")]
    NoReplayPath,

    #[error("'{0}' has no file name")]
    NoFileName(String),

    #[error("Could not move '{from}' to '{to}': {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Moves a file, creating the destination's parent directories.
pub trait FileMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Rename on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl FileMover for FsMover {
    fn move_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::rename(from, to)
    }
}

/// Where a replay was moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub destination: String,
    /// Folder relative to the recording directory, e.g. `/Replays/Valorant/`.
    pub folder: String,
}

/// Compute `<dir>/Replays/<app>/<file>` for a replay saved at `source`.
///
/// Paths are joined with `/` the way the host reports them. A bare file name
/// is placed under `Replays/<app>/` relative to the working directory.
pub fn replay_destination(source: &str, app_name: &str) -> Result<Relocation, RelocateError> {
    let (dir, file) = match source.rfind(['/', '\\']) {
        Some(idx) => (source.get(..idx), source.get(idx + 1..)),
        None => (None, Some(source)),
    };
    let file = file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| RelocateError::NoFileName(source.to_string()))?;

    let folder = format!("/{REPLAYS_DIR}/{app_name}/");
    let destination = match dir {
        Some(dir) => format!("{dir}{folder}{file}"),
        None => format!("{REPLAYS_DIR}/{app_name}/{file}"),
    };

    Ok(Relocation { destination, folder })
}

/// Move the replay at `source` into the folder for `app_name`.
pub fn relocate(
    mover: &dyn FileMover,
    source: &str,
    app_name: &str,
) -> Result<Relocation, RelocateError> {
    let relocation = replay_destination(source, app_name)?;
    info!("Saving replay to: {}", relocation.destination);

    let from = PathBuf::from(source);
    let to = PathBuf::from(&relocation.destination);
    mover
        .move_file(&from, &to)
        .map_err(|source| RelocateError::Move { from, to, source })?;

    Ok(relocation)
}
