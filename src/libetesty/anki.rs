//! Locating Anki profiles and copying downloaded media into one of them.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use log::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

pub const MEDIA_FOLDER: &str = "collection.media";

/// Folders inside the Anki base directory that are not profiles.
const NOT_PROFILES: [&str; 7] = ["logs", "addons21", "addons22", "Anki2", "txt", "db", "json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// `~/.local/share/Anki2`, where Anki keeps its profiles on Linux.
pub fn default_base_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".local").join("share").join("Anki2"))
}

impl Profile {
    pub fn media_dir(&self) -> PathBuf {
        self.path.join(MEDIA_FOLDER)
    }

    pub fn modified_str(&self) -> String {
        match self.modified {
            Some(time) => DateTime::<Local>::from(time)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => "unknown".to_string(),
        }
    }
}

/// Profile folders under `base`, sorted by name.
pub fn list_profiles(base: &Path) -> Result<Vec<Profile>> {
    if !base.is_dir() {
        return Err(Error::MissingDirectory(base.to_path_buf()));
    }

    let mut profiles = Vec::new();
    for entry in fs::read_dir(base).map_err(|e| Error::io(base, e))? {
        let entry = entry.map_err(|e| Error::io(base, e))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if !path.is_dir() || NOT_PROFILES.contains(&name.as_str()) {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified()).ok();
        profiles.push(Profile {
            name,
            path,
            modified,
        });
    }

    profiles.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("[Copy] Found profiles: {:?}", profiles);
    Ok(profiles)
}

/// Turns a 1-based menu answer into an index into `count` profiles.
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    match input.trim().parse::<usize>() {
        Ok(num) if (1..=count).contains(&num) => Ok(num - 1),
        _ => Err(Error::InvalidSelection(input.trim().to_string())),
    }
}

fn is_json(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().to_lowercase().ends_with(".json"))
}

/// Copies every non-JSON file under `source` flat into `dest`. Files that
/// already exist in `dest` are left alone.
pub fn copy_media(source: &Path, dest: &Path) -> Result<CopyReport> {
    if !source.is_dir() {
        return Err(Error::MissingDirectory(source.to_path_buf()));
    }
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;

    let mut report = CopyReport::default();
    for entry in WalkDir::new(source) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!("[Copy] Cannot read entry: {}", e);
                report.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() || is_json(entry.path()) {
            continue;
        }

        let target = dest.join(entry.file_name());
        if target.exists() {
            report.skipped += 1;
            continue;
        }
        match fs::copy(entry.path(), &target) {
            Ok(_) => {
                info!("[Copy] Copied: {}", entry.file_name().to_string_lossy());
                report.copied += 1;
            }
            Err(e) => {
                error!("[Copy] Error copying {:?}: {}", entry.path(), e);
                report.errors += 1;
            }
        }
    }

    Ok(report)
}
