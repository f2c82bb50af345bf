//! Install-type classification and Linux-emulation detection
//!
//! Classifies the current install as global or local from a fixed table of
//! named rules evaluated over the package path and npm environment
//! variables. The install is global if ANY rule matches; when uncertain the
//! classifier prefers `local`, the non-destructive answer for a user tree.
//!
//! Detection never fails: unreadable environment state degrades to
//! `local` / not-emulated.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// How the package was installed, as classified by the rule table
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    Global,
    Local,
}

/// Outcome of one detection rule, retained for diagnostics
#[derive(Serialize, Debug, Clone)]
pub struct RuleOutcome {
    pub rule: &'static str,
    pub matched: bool,
}

impl std::fmt::Display for InstallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallType::Global => write!(f, "global"),
            InstallType::Local => write!(f, "local"),
        }
    }
}

/// Full classification result
#[derive(Debug, Clone)]
pub struct Detection {
    pub install_type: InstallType,
    pub rules: Vec<RuleOutcome>,
    /// Name of the secondary regex pattern that matched, if the primary
    /// rules found nothing but the path still sits in a module store
    pub secondary_pattern: Option<&'static str>,
}

/// Path fragments that only appear under known global install trees.
///
/// The Windows entry uses backslashes as npm reports them; WSL installs
/// of Windows-side node surface through /mnt/<drive> mounts.
const GLOBAL_PATH_FRAGMENTS: &[&str] = &[
    "/.npm-global/",
    "/lib/node_modules/",
    "\\AppData\\Roaming\\npm\\",
    "/.npm-packages/",
    "/npm-global/",
    "/usr/local/lib/node_modules/",
    "/opt/homebrew/lib/node_modules/",
    "/.nvm/versions/node/",
    "/nvm/versions/node/",
    "/mnt/c/",
    "/mnt/d/",
];

const SECONDARY_PATTERNS: &[(&str, &str)] = &[
    ("wsl-mounted-drive", r"[/\\]mnt[/\\][a-z][/\\]"),
    ("roaming-npm", r"(?i)[/\\]appdata[/\\]roaming[/\\]npm[/\\]"),
    ("version-manager-tree", r"[/\\](?:\.nvm|nvm|\.nvs|nodenv)[/\\]"),
];

/// Environment variables consulted by the rule table
#[derive(Debug, Clone, Default)]
pub struct NpmEnv {
    pub config_prefix: Option<String>,
    pub config_globaldir: Option<String>,
    pub root: Option<String>,
}

impl NpmEnv {
    /// Snapshot the npm-provided variables from the process environment
    pub fn from_process() -> Self {
        Self {
            config_prefix: std::env::var("npm_config_prefix").ok(),
            config_globaldir: std::env::var("npm_config_globaldir").ok(),
            root: std::env::var("npm_root").ok(),
        }
    }
}

/// Classify the install from the process environment
pub fn classify_install(package_root: &Path) -> Detection {
    classify_install_with_env(package_root, &NpmEnv::from_process())
}

/// Classify the install against an explicit environment snapshot
pub fn classify_install_with_env(package_root: &Path, env: &NpmEnv) -> Detection {
    let package_path = package_root.display().to_string();

    let rules = vec![
        RuleOutcome {
            rule: "npm-prefix",
            matched: env
                .config_prefix
                .as_deref()
                .is_some_and(|prefix| !prefix.is_empty() && package_path.starts_with(prefix)),
        },
        RuleOutcome {
            rule: "npm-global-root",
            matched: [env.config_globaldir.as_deref(), env.root.as_deref()]
                .into_iter()
                .flatten()
                .any(|root| !root.is_empty() && package_path.contains(root)),
        },
        RuleOutcome {
            rule: "global-path-fragment",
            matched: package_path.contains("node_modules")
                && GLOBAL_PATH_FRAGMENTS
                    .iter()
                    .any(|fragment| package_path.contains(fragment)),
        },
    ];

    let any_matched = rules.iter().any(|r| r.matched);

    // Secondary pass: substring rules missed, but the path still sits in a
    // module store, so try the looser patterns
    let secondary_pattern = if !any_matched && package_path.contains("node_modules") {
        secondary_pattern_match(&package_path)
    } else {
        None
    };

    let install_type = if any_matched || secondary_pattern.is_some() {
        InstallType::Global
    } else {
        InstallType::Local
    };

    Detection {
        install_type,
        rules,
        secondary_pattern,
    }
}

fn secondary_pattern_match(package_path: &str) -> Option<&'static str> {
    SECONDARY_PATTERNS.iter().find_map(|(name, pattern)| {
        regex::Regex::new(pattern)
            .ok()
            .filter(|re| re.is_match(package_path))
            .map(|_| *name)
    })
}

/// Detect a Linux-emulation layer (WSL) under the current kernel
///
/// Reads the kernel version banner; any failure reports `false`.
pub fn is_linux_emulation_layer() -> bool {
    if std::env::consts::OS != "linux" {
        return false;
    }
    match std::fs::read_to_string("/proc/version") {
        Ok(banner) => kernel_banner_is_emulated(&banner),
        Err(_) => false,
    }
}

fn kernel_banner_is_emulated(banner: &str) -> bool {
    let banner = banner.to_lowercase();
    banner.contains("microsoft") || banner.contains("wsl")
}
