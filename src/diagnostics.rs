//! Diagnostics records and the human-readable installation report
//!
//! The diagnostics record serializes the full run: steps attempted,
//! detection rule outcomes, validation results, and a best-effort
//! assessment of which components made it onto disk. It is written once at
//! the end of a run, and additionally as `installation-failure.json` when
//! a critical step failed.

use serde::Serialize;

use crate::common::json;
use crate::context::{COMPONENT_NAMES, DeploymentContext};
use crate::error::{OutpostError, Result};
use crate::platform::detection::{InstallType, RuleOutcome};
use crate::validate::{CheckResult, HealthCheck};

/// Which components are actually present on disk, regardless of what the
/// status records claim
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PartialDeploymentAssessment {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

pub fn assess_partial_deployment(ctx: &DeploymentContext) -> PartialDeploymentAssessment {
    let (present, missing) = COMPONENT_NAMES
        .iter()
        .map(|name| (name.to_string(), ctx.paths.component(name).is_dir()))
        .partition::<Vec<_>, _>(|(_, exists)| *exists);

    PartialDeploymentAssessment {
        present: present.into_iter().map(|(name, _)| name).collect(),
        missing: missing.into_iter().map(|(name, _)| name).collect(),
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsRecord {
    pub timestamp: String,
    pub version: String,
    pub platform: String,
    pub install_type: InstallType,
    pub is_linux_emulation_layer: bool,
    pub detection_rules: Vec<RuleOutcome>,
    pub installation_steps: Vec<String>,
    pub validation_results: Vec<CheckResult>,
    pub partial_deployment_assessment: PartialDeploymentAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DiagnosticsRecord {
    pub fn collect(
        ctx: &DeploymentContext,
        step_log: &[String],
        health: Option<&HealthCheck>,
        error_detail: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: ctx.framework_version.clone(),
            platform: ctx.profile.os_name.clone(),
            install_type: ctx.install_type,
            is_linux_emulation_layer: ctx.profile.is_linux_emulation_layer,
            detection_rules: ctx.detection_rules.clone(),
            installation_steps: step_log.to_vec(),
            validation_results: health.map(|h| h.checks.clone()).unwrap_or_default(),
            partial_deployment_assessment: assess_partial_deployment(ctx),
            error_detail,
        }
    }
}

pub struct DiagnosticsReporter<'a> {
    ctx: &'a DeploymentContext,
}

impl<'a> DiagnosticsReporter<'a> {
    pub fn new(ctx: &'a DeploymentContext) -> Self {
        Self { ctx }
    }

    pub fn write_diagnostics(&self, record: &DiagnosticsRecord) -> Result<()> {
        json::write_json(&self.ctx.paths.diagnostics_file(), record)
    }

    pub fn write_failure(&self, record: &DiagnosticsRecord) -> Result<()> {
        json::write_json(&self.ctx.paths.failure_file(), record)
    }

    /// Render the markdown report; written on every run outcome
    pub fn write_report(
        &self,
        record: &DiagnosticsRecord,
        health: Option<&HealthCheck>,
    ) -> Result<()> {
        let path = self.ctx.paths.report_file();
        std::fs::write(&path, render_report(self.ctx, record, health))
            .map_err(|e| OutpostError::write(&path, e))
    }
}

fn render_report(
    ctx: &DeploymentContext,
    record: &DiagnosticsRecord,
    health: Option<&HealthCheck>,
) -> String {
    let mut report = String::new();

    report.push_str("# Outpost installation report\n\n");
    report.push_str(&format!("- Version: {}\n", record.version));
    report.push_str(&format!("- Date: {}\n", record.timestamp));
    report.push_str(&format!(
        "- Platform: {} ({} install{})\n",
        record.platform,
        record.install_type,
        if record.is_linux_emulation_layer {
            ", Linux emulation layer"
        } else {
            ""
        }
    ));
    report.push_str(&format!(
        "- Deployment directory: {}\n",
        ctx.paths.root().display()
    ));
    report.push_str(&format!(
        "- Package root: {}\n\n",
        ctx.package_root.display()
    ));

    report.push_str("## Installation steps\n\n");
    for step in &record.installation_steps {
        if let Some(name) = step.strip_suffix("_FAILED") {
            report.push_str(&format!("- [x] {name} (FAILED)\n"));
        } else {
            report.push_str(&format!("- [x] {step}\n"));
        }
    }
    report.push('\n');

    if let Some(health) = health {
        report.push_str("## Validation\n\n");
        report.push_str(&format!(
            "Overall health: {}\n\n",
            if health.overall_health { "PASS" } else { "FAIL" }
        ));
        for check in health.failing() {
            report.push_str(&format!("- FAIL {}: {}\n", check.check, check.detail));
        }
        if health.overall_health {
            report.push_str("All checks passed.\n");
        }
        report.push('\n');
    }

    let assessment = &record.partial_deployment_assessment;
    if !assessment.missing.is_empty() {
        report.push_str("## Partially deployed\n\n");
        report.push_str(&format!(
            "Present: {}\n\nMissing: {}\n\n",
            assessment.present.join(", "),
            assessment.missing.join(", ")
        ));
    }

    if let Some(error) = &record.error_detail {
        report.push_str("## Failure\n\n");
        report.push_str(&format!("```\n{error}\n```\n\n"));
        report.push_str("## Troubleshooting\n\n");
        report.push_str(
            "1. Check write permissions on the deployment directory.\n\
             2. Re-run the installer with `npm rebuild outpost`, or reinstall the package.\n\
             3. Run `bin/outpost-doctor` for an independent health check.\n\
             4. Inspect `installation-failure.json` for the full record.\n",
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::context_with_home;
    use tempfile::TempDir;

    #[test]
    fn test_assessment_partitions_present_and_missing() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.component("framework")).unwrap();
        std::fs::create_dir_all(ctx.paths.component("agents")).unwrap();

        let assessment = assess_partial_deployment(&ctx);

        assert_eq!(assessment.present, vec!["framework", "agents"]);
        assert!(assessment.missing.contains(&"scripts".to_string()));
        assert_eq!(
            assessment.present.len() + assessment.missing.len(),
            COMPONENT_NAMES.len()
        );
    }

    #[test]
    fn test_failure_record_round_trips_with_error_detail() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let record = DiagnosticsRecord::collect(
            &ctx,
            &["preflight".to_string(), "component-deployment_FAILED".to_string()],
            None,
            Some("disk full".to_string()),
        );
        DiagnosticsReporter::new(&ctx).write_failure(&record).unwrap();

        let on_disk: serde_json::Value =
            json::read_json(&ctx.paths.failure_file()).unwrap();
        assert_eq!(on_disk["errorDetail"], "disk full");
        assert_eq!(
            on_disk["installationSteps"][1],
            "component-deployment_FAILED"
        );
    }

    #[test]
    fn test_report_names_failed_steps_and_troubleshooting() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let record = DiagnosticsRecord::collect(
            &ctx,
            &["preflight".to_string(), "directory-structure_FAILED".to_string()],
            None,
            Some("permission denied".to_string()),
        );
        DiagnosticsReporter::new(&ctx)
            .write_report(&record, None)
            .unwrap();

        let report = std::fs::read_to_string(ctx.paths.report_file()).unwrap();
        assert!(report.contains("directory-structure (FAILED)"));
        assert!(report.contains("## Troubleshooting"));
        assert!(report.contains("permission denied"));
    }
}
