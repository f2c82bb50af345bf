//! Platform facts and platform-specific deployment artifacts
//!
//! This module is organized into:
//! - [`detection`]: install-type classification and Linux-emulation detection
//! - [`scripts`]: pure script template functions per platform family
//! - [`adapter`]: filesystem side effects (wrappers, permissions, PATH)

pub mod adapter;
pub mod detection;
pub mod scripts;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{OutpostError, Result};

/// Operating system family the installer distinguishes between
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Unix,
    Windows,
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Unix => write!(f, "unix"),
            Family::Windows => write!(f, "windows"),
        }
    }
}

/// Static facts about the execution environment
///
/// Computed once per run and read-only afterward.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlatformProfile {
    pub family: Family,
    /// OS name as reported by the toolchain (`linux`, `macos`, `windows`, ...)
    pub os_name: String,
    pub home_dir: PathBuf,
    pub path_separator: char,
    /// Shell configuration files considered for PATH injection, in order
    pub shell_config_candidates: Vec<PathBuf>,
    /// True when running Linux tooling atop a Windows kernel (WSL)
    pub is_linux_emulation_layer: bool,
}

impl PlatformProfile {
    /// Build the profile for the current process
    ///
    /// `home_override` replaces the detected home directory; tests and
    /// sandboxed package managers use it to redirect the deployment tree.
    pub fn current(home_override: Option<PathBuf>) -> Result<Self> {
        let home_dir = match home_override {
            Some(home) => home,
            None => dirs::home_dir().ok_or(OutpostError::HomeDirUnavailable)?,
        };

        let family = if cfg!(windows) {
            Family::Windows
        } else {
            Family::Unix
        };

        let shell_config_candidates = match family {
            Family::Unix => vec![
                home_dir.join(".bashrc"),
                home_dir.join(".zshrc"),
                home_dir.join(".profile"),
            ],
            // cmd.exe has no shell rc files; PATH changes go through the
            // registry, which a postinstall hook must not touch
            Family::Windows => Vec::new(),
        };

        Ok(Self {
            family,
            os_name: std::env::consts::OS.to_string(),
            home_dir,
            path_separator: std::path::MAIN_SEPARATOR,
            shell_config_candidates,
            is_linux_emulation_layer: detection::is_linux_emulation_layer(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_profile_with_home_override() {
        let temp = TempDir::new().unwrap();
        let profile = PlatformProfile::current(Some(temp.path().to_path_buf())).unwrap();

        assert_eq!(profile.home_dir, temp.path());
        assert_eq!(profile.os_name, std::env::consts::OS);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_shell_config_candidates() {
        let temp = TempDir::new().unwrap();
        let profile = PlatformProfile::current(Some(temp.path().to_path_buf())).unwrap();

        assert_eq!(profile.family, Family::Unix);
        let names: Vec<_> = profile
            .shell_config_candidates
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec![".bashrc", ".zshrc", ".profile"]);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let temp = TempDir::new().unwrap();
        let profile = PlatformProfile::current(Some(temp.path().to_path_buf())).unwrap();

        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"isLinuxEmulationLayer\""));
        assert!(json.contains("\"shellConfigCandidates\""));
    }
}
