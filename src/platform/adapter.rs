//! Platform adaptation: wrapper scripts, permissions, PATH integration
//!
//! Produces the OS-specific artifacts around the deployed tree. Any single
//! artifact failing is logged and skipped; adaptation always carries on to
//! the remaining artifacts.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::{fs as fsops, json};
use crate::context::DeploymentContext;
use crate::error::{OutpostError, Result};
use crate::platform::{Family, scripts};
use crate::ui;

/// Wrapper command names: primary and short alias
const WRAPPER_NAMES: [&str; 2] = ["outpost", "ost"];
const HEALTH_CHECK_NAME: &str = "outpost-doctor";

/// Record of what adaptation produced, serialized into platform-config.json
#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifacts {
    pub wrappers: Vec<PathBuf>,
    pub health_check: Option<PathBuf>,
    /// Shell config files that received a PATH line this run
    pub path_injections: Vec<PathBuf>,
    /// Count of scripts whose executable bit was set
    pub executables_marked: usize,
    /// Artifacts that failed, as "name: reason"
    pub skipped: Vec<String>,
}

pub struct PlatformAdapter<'a> {
    ctx: &'a DeploymentContext,
}

impl<'a> PlatformAdapter<'a> {
    pub fn new(ctx: &'a DeploymentContext) -> Self {
        Self { ctx }
    }

    /// Generate all platform artifacts, tolerating per-artifact failures
    pub fn adapt(&self) -> GeneratedArtifacts {
        let mut artifacts = GeneratedArtifacts::default();

        self.write_wrappers(&mut artifacts);
        self.write_health_check(&mut artifacts);

        if self.ctx.profile.family == Family::Unix {
            self.mark_scripts_executable(&mut artifacts);
            self.inject_path(&mut artifacts);
        }

        artifacts
    }

    /// Persist the profile and artifact record next to the deployed tree
    pub fn write_platform_config(&self, artifacts: &GeneratedArtifacts) -> Result<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PlatformConfig<'a> {
            profile: &'a crate::platform::PlatformProfile,
            artifacts: &'a GeneratedArtifacts,
        }

        json::write_json(
            &self.ctx.paths.platform_config_file(),
            &PlatformConfig {
                profile: &self.ctx.profile,
                artifacts,
            },
        )
    }

    fn write_wrappers(&self, artifacts: &mut GeneratedArtifacts) {
        let deploy_dir = self.ctx.paths.root();
        let bin = self.ctx.paths.bin();

        for name in WRAPPER_NAMES {
            let (file_name, content) = match self.ctx.profile.family {
                Family::Unix => (name.to_string(), scripts::unix_wrapper(deploy_dir)),
                Family::Windows => {
                    (format!("{name}.cmd"), scripts::windows_wrapper(deploy_dir))
                }
            };
            let path = bin.join(file_name);

            match write_script(&path, &content) {
                Ok(()) => artifacts.wrappers.push(path),
                Err(e) => record_skip(artifacts, &format!("wrapper {name}"), &e),
            }
        }
    }

    fn write_health_check(&self, artifacts: &mut GeneratedArtifacts) {
        let deploy_dir = self.ctx.paths.root();
        let (file_name, content) = match self.ctx.profile.family {
            Family::Unix => (
                HEALTH_CHECK_NAME.to_string(),
                scripts::unix_health_check(deploy_dir),
            ),
            Family::Windows => (
                format!("{HEALTH_CHECK_NAME}.cmd"),
                scripts::windows_health_check(deploy_dir),
            ),
        };
        let path = self.ctx.paths.bin().join(file_name);

        match write_script(&path, &content) {
            Ok(()) => artifacts.health_check = Some(path),
            Err(e) => record_skip(artifacts, "health-check script", &e),
        }
    }

    /// Set the executable bit on every file under the deployed scripts/
    /// component (copied scripts lose their mode in npm tarballs)
    fn mark_scripts_executable(&self, artifacts: &mut GeneratedArtifacts) {
        let scripts_dir = self.ctx.paths.component("scripts");
        if !scripts_dir.is_dir() {
            return;
        }

        for entry in walkdir::WalkDir::new(&scripts_dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
        {
            match fsops::set_executable(entry.path()) {
                Ok(()) => artifacts.executables_marked += 1,
                Err(e) => record_skip(
                    artifacts,
                    &format!("chmod {}", entry.path().display()),
                    &e,
                ),
            }
        }
    }

    /// Append the PATH line to each existing shell config candidate,
    /// skipping files that already mention the bin directory
    fn inject_path(&self, artifacts: &mut GeneratedArtifacts) {
        let bin = self.ctx.paths.bin();
        let line = scripts::path_export_line(&bin);
        let bin_str = bin.display().to_string();

        for candidate in &self.ctx.profile.shell_config_candidates {
            if !candidate.is_file() {
                continue;
            }

            match append_path_line(candidate, &bin_str, &line) {
                Ok(true) => artifacts.path_injections.push(candidate.clone()),
                Ok(false) => {
                    // Already present; repeated installs must not accrete
                }
                Err(e) => record_skip(
                    artifacts,
                    &format!("PATH line in {}", candidate.display()),
                    &e,
                ),
            }
        }
    }
}

fn write_script(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fsops::ensure_dir(parent)?;
    }
    std::fs::write(path, content).map_err(|e| OutpostError::write(path, e))?;
    fsops::set_executable(path)
}

/// Returns Ok(true) if the line was appended, Ok(false) if already present
fn append_path_line(config: &Path, bin_str: &str, line: &str) -> Result<bool> {
    let content = std::fs::read_to_string(config).map_err(|e| OutpostError::read(config, e))?;
    if content.contains(bin_str) {
        return Ok(false);
    }

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(config)
        .map_err(|e| OutpostError::write(config, e))?;

    let separator = if content.is_empty() || content.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    writeln!(file, "{separator}{line}").map_err(|e| OutpostError::write(config, e))?;
    Ok(true)
}

fn record_skip(artifacts: &mut GeneratedArtifacts, what: &str, e: &OutpostError) {
    ui::warn(&format!("Skipping {what}: {e}"));
    artifacts.skipped.push(format!("{what}: {e}"));
}
