//! Post-deployment validation and health checking
//!
//! Re-examines the deployed tree, the configuration file, and directory
//! permissions. Checks are independent and order-insensitive; any check's
//! internal failure is contained and reported as that check failing.
//! `overallHealth` is the AND of every check.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::common::json;
use crate::config::DeploymentConfig;
use crate::context::{COMPONENT_NAMES, DeploymentContext};
use crate::error::Result;
use crate::platform::Family;

/// Mandatory top-level fields of `config.json`
const MANDATORY_CONFIG_FIELDS: [&str; 3] = ["version", "deploymentPaths", "platform"];

const WRITE_PROBE_NAME: &str = ".outpost-write-probe";

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub check: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn new(check: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub timestamp: String,
    pub checks: Vec<CheckResult>,
    pub overall_health: bool,
}

impl HealthCheck {
    pub fn failing(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

pub struct HealthChecker<'a> {
    ctx: &'a DeploymentContext,
}

impl<'a> HealthChecker<'a> {
    pub fn new(ctx: &'a DeploymentContext) -> Self {
        Self { ctx }
    }

    /// Run all checks; never errors
    pub fn run(&self) -> HealthCheck {
        let mut checks = Vec::new();

        checks.push(self.check_config_file());
        checks.push(self.check_components_deployed());
        checks.push(self.check_platform_environment());
        checks.extend(self.check_directory_permissions());
        checks.extend(self.check_deployment_paths());

        let overall_health = checks.iter().all(|c| c.passed);
        HealthCheck {
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks,
            overall_health,
        }
    }

    /// Write `health-check.json` and fold the outcomes into `config.json`
    pub fn persist(&self, health: &HealthCheck) -> Result<()> {
        json::write_json(&self.ctx.paths.health_check_file(), health)?;

        let outcomes: BTreeMap<String, bool> = health
            .checks
            .iter()
            .map(|c| (c.check.clone(), c.passed))
            .collect();
        DeploymentConfig::record_validation(self.ctx, &outcomes)
    }

    fn check_config_file(&self) -> CheckResult {
        let path = self.ctx.paths.config_file();
        let value: serde_json::Value = match json::read_json(&path) {
            Ok(v) => v,
            Err(e) => {
                return CheckResult::new("config-file", false, e.to_string());
            }
        };

        let missing: Vec<&str> = MANDATORY_CONFIG_FIELDS
            .iter()
            .filter(|field| value.get(**field).is_none())
            .copied()
            .collect();

        if missing.is_empty() {
            CheckResult::new("config-file", true, "all mandatory fields present")
        } else {
            CheckResult::new(
                "config-file",
                false,
                format!("missing fields: {}", missing.join(", ")),
            )
        }
    }

    fn check_components_deployed(&self) -> CheckResult {
        let config = DeploymentConfig::load_or_init(self.ctx);
        let undeployed: Vec<&str> = COMPONENT_NAMES
            .iter()
            .filter(|name| {
                !config
                    .components
                    .get(**name)
                    .is_some_and(|status| status.deployed)
            })
            .copied()
            .collect();

        if undeployed.is_empty() {
            CheckResult::new("components-deployed", true, "all components deployed")
        } else {
            CheckResult::new(
                "components-deployed",
                false,
                format!("not deployed: {}", undeployed.join(", ")),
            )
        }
    }

    fn check_platform_environment(&self) -> CheckResult {
        let markers: &[&str] = match self.ctx.profile.family {
            Family::Unix => &["HOME"],
            Family::Windows => &["USERPROFILE", "OS"],
        };
        let found = markers.iter().any(|var| std::env::var_os(var).is_some());

        CheckResult::new(
            "platform-environment",
            found,
            if found {
                format!("OS marker variable present ({})", markers.join("/"))
            } else {
                format!("none of {} set", markers.join("/"))
            },
        )
    }

    /// One check per component: the directory accepts a write-then-delete
    /// marker probe
    fn check_directory_permissions(&self) -> Vec<CheckResult> {
        self.ctx
            .paths
            .components()
            .into_iter()
            .map(|(name, dir)| match probe_writable(&dir) {
                Ok(()) => CheckResult::new(
                    format!("permissions:{name}"),
                    true,
                    "readable and writable",
                ),
                Err(detail) => CheckResult::new(format!("permissions:{name}"), false, detail),
            })
            .collect()
    }

    /// One check per recorded deployment path: it resolves and is readable
    fn check_deployment_paths(&self) -> Vec<CheckResult> {
        let config = DeploymentConfig::load_or_init(self.ctx);
        config
            .deployment_paths
            .iter()
            .map(|(name, path)| match probe_readable(path) {
                Ok(()) => CheckResult::new(format!("path:{name}"), true, "accessible"),
                Err(detail) => CheckResult::new(format!("path:{name}"), false, detail),
            })
            .collect()
    }
}

fn probe_writable(dir: &Path) -> std::result::Result<(), String> {
    if !dir.is_dir() {
        return Err(format!("directory missing: {}", dir.display()));
    }
    let probe = dir.join(WRITE_PROBE_NAME);
    std::fs::write(&probe, b"probe").map_err(|e| format!("not writable: {e}"))?;
    std::fs::remove_file(&probe).map_err(|e| format!("probe cleanup failed: {e}"))?;
    Ok(())
}

fn probe_readable(path: &Path) -> std::result::Result<(), String> {
    let resolved = dunce::canonicalize(path)
        .map_err(|e| format!("does not resolve: {e}"))?;
    std::fs::read_dir(&resolved)
        .map(|_| ())
        .map_err(|e| format!("not readable: {e}"))
}
