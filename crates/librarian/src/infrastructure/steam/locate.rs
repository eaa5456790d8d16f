//! Finding Steam's install directory and the user whose shortcuts we manage.
//!
//! The install directory comes from `steam.steam_path` when configured, and
//! from [`steamlocate`] otherwise (the registry `SteamPath` on Windows, the
//! usual native and Flatpak homes elsewhere).
//!
//! ```text
//! <steam>/
//!   userdata/
//!     <user id>/config/shortcuts.vdf
//!     <user id>/config/grid/         custom artwork
//! ```

use std::path::{Path, PathBuf};

use steamlocate::SteamDir;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for locating Steam and its users.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("Steam installation not found; set steam.steam_path: {source}")]
    SteamNotFound {
        #[source]
        source: steamlocate::Error,
    },

    #[error("configured Steam path {path} is not a directory")]
    InvalidSteamPath { path: PathBuf },

    #[error("no Steam users found in {userdata}; log in to Steam once first")]
    NoUsers { userdata: PathBuf },

    #[error("Steam user {user_id} not found in {userdata}")]
    UnknownUser { user_id: String, userdata: PathBuf },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One Steam user's configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamUser {
    pub steam_root: PathBuf,
    pub user_id: String,
}

impl SteamUser {
    fn config_dir(&self) -> PathBuf {
        self.steam_root
            .join("userdata")
            .join(&self.user_id)
            .join("config")
    }

    /// `<steam>/userdata/<id>/config/shortcuts.vdf`
    pub fn shortcuts_path(&self) -> PathBuf {
        self.config_dir().join("shortcuts.vdf")
    }

    /// `<steam>/userdata/<id>/config/grid`
    pub fn grid_dir(&self) -> PathBuf {
        self.config_dir().join("grid")
    }
}

/// Resolves the Steam root: `configured` if given, else the installation
/// `steamlocate` finds.
///
/// # Errors
///
/// Returns [`LocateError::InvalidSteamPath`] for a configured path that is
/// not a directory, or [`LocateError::SteamNotFound`] when Steam cannot be
/// located.
pub fn find_steam_root(configured: Option<&Path>) -> Result<PathBuf, LocateError> {
    resolve_root(configured, || {
        SteamDir::locate()
            .map(|dir| dir.path().to_path_buf())
            .map_err(|source| LocateError::SteamNotFound { source })
    })
}

fn resolve_root(
    configured: Option<&Path>,
    locate: impl FnOnce() -> Result<PathBuf, LocateError>,
) -> Result<PathBuf, LocateError> {
    if let Some(path) = configured {
        if !path.is_dir() {
            return Err(LocateError::InvalidSteamPath {
                path: path.to_path_buf(),
            });
        }
        return Ok(path.to_path_buf());
    }
    let root = locate()?;
    debug!("found Steam at {}", root.display());
    Ok(root)
}

/// Numeric user directories under `<steam>/userdata`, sorted.
///
/// # Errors
///
/// Returns [`LocateError::NoUsers`] if `userdata` is missing, or
/// [`LocateError::Io`] if it cannot be listed.
pub fn user_ids(steam_root: &Path) -> Result<Vec<String>, LocateError> {
    let userdata = steam_root.join("userdata");
    let entries = match std::fs::read_dir(&userdata) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LocateError::NoUsers { userdata })
        }
        Err(source) => {
            return Err(LocateError::Io {
                path: userdata,
                source,
            })
        }
    };

    let mut ids: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()))
        .filter(|name| name != "0")
        .collect();
    ids.sort_by_key(|id| id.parse::<u64>().unwrap_or(u64::MAX));
    Ok(ids)
}

/// Picks the user whose shortcuts are managed.
///
/// A configured ID must exist.  Otherwise the only user is chosen, or the
/// first one with a warning when several have logged in.
///
/// # Errors
///
/// Returns [`LocateError::UnknownUser`] or [`LocateError::NoUsers`].
pub fn select_user(steam_root: &Path, configured: Option<&str>) -> Result<SteamUser, LocateError> {
    let userdata = steam_root.join("userdata");
    let ids = user_ids(steam_root)?;

    let user_id = match configured {
        Some(id) => ids
            .iter()
            .find(|candidate| candidate.as_str() == id)
            .cloned()
            .ok_or_else(|| LocateError::UnknownUser {
                user_id: id.to_string(),
                userdata: userdata.clone(),
            })?,
        None => {
            let first = ids
                .first()
                .cloned()
                .ok_or(LocateError::NoUsers { userdata })?;
            if ids.len() > 1 {
                warn!(
                    "several Steam users found ({}); using {first}. Set steam.user_id to choose",
                    ids.join(", ")
                );
            }
            first
        }
    };

    Ok(SteamUser {
        steam_root: steam_root.to_path_buf(),
        user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn fake_steam(users: &[&str]) -> PathBuf {
        let root = std::env::temp_dir().join(format!("librarian_steam_{}", Uuid::new_v4()));
        std::fs::create_dir_all(root.join("appcache")).unwrap();
        for user in users {
            std::fs::create_dir_all(root.join("userdata").join(user).join("config")).unwrap();
        }
        root
    }

    #[test]
    fn test_configured_root_skips_detection() {
        // Arrange
        let root = fake_steam(&[]);

        // Act
        let found = resolve_root(Some(&root), || panic!("detection must not run"));

        // Assert
        assert_eq!(found.unwrap(), root);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_detected_root_is_used_without_configured_path() {
        let root = fake_steam(&[]);

        let found = resolve_root(None, || Ok(root.clone())).unwrap();

        assert_eq!(found, root);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_detection_failure_is_returned() {
        let result = resolve_root(None, || {
            Err(LocateError::NoUsers {
                userdata: PathBuf::from("/nowhere/userdata"),
            })
        });
        assert!(matches!(result, Err(LocateError::NoUsers { .. })));
    }

    #[test]
    fn test_configured_root_must_exist() {
        let missing = std::env::temp_dir().join(format!("missing_{}", Uuid::new_v4()));
        assert!(matches!(
            find_steam_root(Some(&missing)),
            Err(LocateError::InvalidSteamPath { .. })
        ));
    }

    #[test]
    fn test_user_ids_are_numeric_and_sorted() {
        let root = fake_steam(&["200", "30", "anonymous", "0"]);

        assert_eq!(user_ids(&root).unwrap(), vec!["30", "200"]);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_single_user_is_selected() {
        let root = fake_steam(&["12345678"]);

        let user = select_user(&root, None).unwrap();

        assert_eq!(user.user_id, "12345678");
        assert_eq!(
            user.shortcuts_path(),
            root.join("userdata/12345678/config/shortcuts.vdf")
        );
        assert_eq!(user.grid_dir(), root.join("userdata/12345678/config/grid"));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_configured_user_must_exist() {
        let root = fake_steam(&["1"]);

        assert!(matches!(
            select_user(&root, Some("2")),
            Err(LocateError::UnknownUser { .. })
        ));
        assert_eq!(select_user(&root, Some("1")).unwrap().user_id, "1");
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_no_userdata_is_no_users() {
        let root = fake_steam(&[]);
        assert!(matches!(
            select_user(&root, None),
            Err(LocateError::NoUsers { .. })
        ));
        std::fs::remove_dir_all(&root).ok();
    }
}
