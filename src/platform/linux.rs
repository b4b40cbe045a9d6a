//! App registry backed by XDG desktop entries.
//!
//! The package identifier of an app is its desktop file id, e.g.
//! `org.mozilla.firefox` for `applications/org.mozilla.firefox.desktop`.

use super::{AppRegistry, LaunchableApp};
use crate::error::PlatformError;
use crate::models::DeclaredCategory;
use directories::BaseDirs;
use log::{debug, warn};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

const DESKTOP_GROUP: &str = "[Desktop Entry]";
const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";
const FIELD_CODES: &[&str] = &[
    "%f", "%F", "%u", "%U", "%d", "%D", "%n", "%N", "%i", "%c", "%k", "%v", "%m",
];

/// The keys of a `[Desktop Entry]` group the drawer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesktopEntry {
    pub id: String,
    pub entry_type: String,
    pub name: String,
    pub icon: Option<String>,
    pub exec: Option<String>,
    pub categories: Vec<String>,
    pub no_display: bool,
    pub hidden: bool,
}

impl DesktopEntry {
    pub fn parse(id: &str, contents: &str) -> Result<Self, PlatformError> {
        let malformed = |reason: &str| PlatformError::MalformedEntry {
            package: id.to_string(),
            reason: reason.to_string(),
        };

        let mut in_group = false;
        let mut seen_group = false;
        let mut entry = Self {
            id: id.to_string(),
            ..Self::default()
        };
        let mut name = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_group = line == DESKTOP_GROUP;
                seen_group |= in_group;
                continue;
            }
            if !in_group {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Type" => entry.entry_type = value.to_string(),
                "Name" => name = Some(value.to_string()),
                "Icon" if !value.is_empty() => entry.icon = Some(value.to_string()),
                "Exec" if !value.is_empty() => entry.exec = Some(value.to_string()),
                "Categories" => {
                    entry.categories = value
                        .split(';')
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "NoDisplay" => entry.no_display = value.eq_ignore_ascii_case("true"),
                "Hidden" => entry.hidden = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if !seen_group {
            return Err(malformed("missing [Desktop Entry] group"));
        }
        entry.name = name.ok_or_else(|| malformed("missing Name"))?;
        Ok(entry)
    }

    pub fn is_launchable(&self) -> bool {
        self.entry_type == "Application" && !self.no_display && !self.hidden && self.exec.is_some()
    }

    /// First freedesktop category that has a platform equivalent.
    pub fn declared_category(&self) -> Option<DeclaredCategory> {
        self.categories.iter().find_map(|c| match c.as_str() {
            "Game" => Some(DeclaredCategory::Game),
            "Audio" => Some(DeclaredCategory::Audio),
            "Video" => Some(DeclaredCategory::Video),
            "Graphics" | "Photography" => Some(DeclaredCategory::Image),
            "Chat" | "InstantMessaging" => Some(DeclaredCategory::Social),
            "News" => Some(DeclaredCategory::News),
            "Maps" => Some(DeclaredCategory::Maps),
            "Office" => Some(DeclaredCategory::Productivity),
            "Accessibility" => Some(DeclaredCategory::Accessibility),
            _ => None,
        })
    }
}

/// Split an `Exec` value into argv, dropping field codes.
pub fn exec_argv(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = exec.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }

    args.into_iter()
        .filter(|arg| !FIELD_CODES.contains(&arg.as_str()))
        .map(|arg| arg.replace("%%", "%"))
        .collect()
}

/// Every `.desktop` file under `applications`, keyed by desktop file id.
///
/// Files in subdirectories get ids joined with `-`, so
/// `applications/kde4/konsole.desktop` is `kde4-konsole`. Symlinked
/// directories are not followed. Results are in path order.
fn desktop_files(applications: &Path) -> Vec<(String, PathBuf)> {
    let mut found = Vec::new();
    collect_desktop_files(applications, "", &mut found);
    found
}

fn collect_desktop_files(dir: &Path, prefix: &str, found: &mut Vec<(String, PathBuf)>) {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            debug!("Skipping {}: {e}", dir.display());
            return;
        }
    };
    let mut entries: Vec<_> = read_dir.flatten().collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            collect_desktop_files(&path, &format!("{prefix}{name}-"), found);
            continue;
        }
        if let Some(stem) = name.strip_suffix(".desktop") {
            found.push((format!("{prefix}{stem}"), path));
        }
    }
}

/// Spawn `command`, waiting on it from a background thread so an exited app
/// does not linger as a zombie.
fn spawn_reaped(command: &mut Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(thread::spawn(move || child.wait()))
}

/// Data directory an entry was found under.
#[derive(Debug, Clone)]
struct DataDir {
    applications: PathBuf,
    is_system: bool,
}

pub struct DesktopEntryRegistry {
    dirs: Vec<DataDir>,
}

impl DesktopEntryRegistry {
    /// Search `user_dir` first, then `system_dirs` in order. Each path is an
    /// XDG data directory; entries live in its `applications/` subdirectory.
    pub fn new(user_dir: Option<PathBuf>, system_dirs: Vec<PathBuf>) -> Self {
        let user = user_dir.into_iter().map(|dir| DataDir {
            applications: dir.join("applications"),
            is_system: false,
        });
        let system = system_dirs.into_iter().map(|dir| DataDir {
            applications: dir.join("applications"),
            is_system: true,
        });
        Self {
            dirs: user.chain(system).collect(),
        }
    }

    pub fn from_environment() -> Self {
        let user_dir = BaseDirs::new().map(|dirs| dirs.data_dir().to_path_buf());
        let data_dirs = std::env::var("XDG_DATA_DIRS")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
        let system_dirs = data_dirs
            .split(':')
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect();
        Self::new(user_dir, system_dirs)
    }

    fn locate(&self, package_id: &str) -> Option<(PathBuf, bool)> {
        // Ids are file names, never paths; anything else could escape the data dirs.
        if package_id.is_empty() || package_id.contains(['/', '\\']) || package_id.contains("..") {
            return None;
        }
        let file_name = format!("{package_id}.desktop");
        self.dirs.iter().find_map(|dir| {
            let path = dir.applications.join(&file_name);
            if path.is_file() {
                return Some((path, dir.is_system));
            }
            desktop_files(&dir.applications)
                .into_iter()
                .find(|(id, _)| id == package_id)
                .map(|(_, path)| (path, dir.is_system))
        })
    }

    fn read_entry(path: &Path, package_id: &str) -> Result<DesktopEntry, PlatformError> {
        let contents = std::fs::read_to_string(path)?;
        DesktopEntry::parse(package_id, &contents)
    }
}

impl AppRegistry for DesktopEntryRegistry {
    fn launchable_packages(&self) -> Result<Vec<String>, PlatformError> {
        let mut seen = HashSet::new();
        let mut packages = Vec::new();

        for dir in &self.dirs {
            for (id, path) in desktop_files(&dir.applications) {
                // Earlier directories shadow later ones, including their NoDisplay entries.
                if !seen.insert(id.clone()) {
                    continue;
                }
                match Self::read_entry(&path, &id) {
                    Ok(desktop) if !desktop.is_launchable() => continue,
                    // Unreadable entries are still listed so the failure is reported per entry.
                    Ok(_) | Err(_) => packages.push(id),
                }
            }
        }

        packages.sort();
        Ok(packages)
    }

    fn app_info(&self, package_id: &str) -> Result<LaunchableApp, PlatformError> {
        let (path, is_system) = self
            .locate(package_id)
            .ok_or_else(|| PlatformError::PackageNotFound(package_id.to_string()))?;
        let entry = Self::read_entry(&path, package_id)?;

        Ok(LaunchableApp {
            package_id: package_id.to_string(),
            declared_category: entry.declared_category(),
            label: entry.name,
            icon: entry.icon,
            is_system,
        })
    }

    fn launch(&self, package_id: &str) -> bool {
        let Some((path, _)) = self.locate(package_id) else {
            warn!("Cannot launch {package_id}: no desktop entry");
            return false;
        };
        let exec = match Self::read_entry(&path, package_id) {
            Ok(DesktopEntry { exec: Some(exec), .. }) => exec,
            Ok(_) => {
                warn!("Cannot launch {package_id}: entry has no Exec");
                return false;
            }
            Err(e) => {
                warn!("Cannot launch {package_id}: {e}");
                return false;
            }
        };

        let argv = exec_argv(&exec);
        let Some((program, args)) = argv.split_first() else {
            warn!("Cannot launch {package_id}: empty Exec");
            return false;
        };

        // stdout belongs to the host protocol; the child must not inherit it.
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        match spawn_reaped(&mut command) {
            Ok(_) => true,
            Err(e) => {
                warn!("Failed to launch {package_id}: {e}");
                false
            }
        }
    }
}
