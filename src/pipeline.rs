//! The safe-execution installation pipeline
//!
//! Steps are tagged descriptors rather than matched by name: a critical
//! step failing halts the run and triggers failure diagnostics, a
//! non-critical step failing is logged and skipped. Whatever happens, the
//! process outcome never fails the surrounding npm install.

use crate::config::DeploymentConfig;
use crate::context::DeploymentContext;
use crate::deploy::{ComponentDeployer, manifest};
use crate::diagnostics::{DiagnosticsRecord, DiagnosticsReporter};
use crate::error::{OutpostError, Result};
use crate::platform::adapter::PlatformAdapter;
use crate::template::{self, DocOutcome};
use crate::ui::{self, StepProgress};
use crate::validate::{HealthCheck, HealthChecker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Critical,
    NonCritical,
}

/// One named pipeline step
struct Step {
    kind: StepKind,
    name: &'static str,
    run: fn(&mut RunData) -> Result<()>,
}

/// Pipeline progress, visible to callers for the final console summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running(usize),
    Completed,
    PartiallyCompleted,
    CriticallyFailed,
}

/// Mutable state threaded through the steps
pub struct RunData {
    pub ctx: DeploymentContext,
    pub skip_validation: bool,
    pub state: RunState,
    pub health: Option<HealthCheck>,
    pub step_log: Vec<String>,
}

impl RunData {
    pub fn new(ctx: DeploymentContext, skip_validation: bool) -> Self {
        Self {
            ctx,
            skip_validation,
            state: RunState::NotStarted,
            health: None,
            step_log: Vec::new(),
        }
    }
}

fn steps() -> [Step; 7] {
    [
        Step {
            kind: StepKind::NonCritical,
            name: "preflight",
            run: preflight,
        },
        Step {
            kind: StepKind::Critical,
            name: "directory-structure",
            run: directory_structure,
        },
        Step {
            kind: StepKind::Critical,
            name: "component-deployment",
            run: component_deployment,
        },
        Step {
            kind: StepKind::NonCritical,
            name: "instruction-document",
            run: instruction_document,
        },
        Step {
            kind: StepKind::NonCritical,
            name: "platform-adaptation",
            run: platform_adaptation,
        },
        Step {
            kind: StepKind::Critical,
            name: "comprehensive-validation",
            run: comprehensive_validation,
        },
        Step {
            kind: StepKind::NonCritical,
            name: "installation-report",
            run: installation_report,
        },
    ]
}

/// Execute the pipeline to completion or to the first critical failure
pub fn run(data: &mut RunData) -> RunState {
    let steps = steps();
    let progress = StepProgress::new(steps.len() as u64);
    let mut critical_error: Option<OutpostError> = None;

    for (index, step) in steps.iter().enumerate() {
        data.state = RunState::Running(index);
        progress.begin_step(step.name);
        if data.ctx.verbose {
            ui::detail(&format!("step {}/{}: {}", index + 1, steps.len(), step.name));
        }

        match (step.run)(data) {
            Ok(()) => {
                data.step_log.push(step.name.to_string());
                progress.finish_step();
            }
            Err(e) => {
                data.step_log.push(format!("{}_FAILED", step.name));
                match step.kind {
                    StepKind::Critical => {
                        ui::error(&format!("Critical step '{}' failed: {e}", step.name));
                        critical_error = Some(e);
                        break;
                    }
                    StepKind::NonCritical => {
                        ui::warn(&format!("Step '{}' failed, continuing: {e}", step.name));
                        progress.finish_step();
                    }
                }
            }
        }
    }

    data.state = if let Some(error) = critical_error {
        progress.abandon("installation failed");
        finalize_failure(data, &error);
        RunState::CriticallyFailed
    } else {
        progress.finish("installation finished");
        finalize_success(data);
        if data.step_log.iter().any(|s| s.ends_with("_FAILED")) {
            RunState::PartiallyCompleted
        } else {
            RunState::Completed
        }
    };
    data.state
}

fn preflight(data: &mut RunData) -> Result<()> {
    if !data.ctx.package_root.exists() {
        ui::warn(&format!(
            "Package root not found: {} (defaults will be synthesized)",
            data.ctx.package_root.display()
        ));
    }

    if which::which("node").is_err() && which::which("nodejs").is_err() {
        ui::warn("No node runtime found on PATH; wrappers will not run until one is installed");
    }

    // The deployment root must be writable for anything else to work
    crate::common::fs::ensure_dir(data.ctx.paths.root())?;
    let probe = tempfile::NamedTempFile::new_in(data.ctx.paths.root())
        .map_err(|e| OutpostError::write(data.ctx.paths.root(), e))?;
    probe
        .close()
        .map_err(|e| OutpostError::write(data.ctx.paths.root(), e))?;
    Ok(())
}

fn directory_structure(data: &mut RunData) -> Result<()> {
    let paths = &data.ctx.paths;

    for (_, dir) in paths.components() {
        crate::common::fs::ensure_dir(&dir)?;
    }
    crate::common::fs::ensure_dir(&paths.bin())?;
    for tier in paths.agent_tiers() {
        crate::common::fs::ensure_dir(&tier)?;
    }

    // Materialize config.json up front so every later stage (and a crash
    // in between) finds a readable record
    DeploymentConfig::load_or_init(&data.ctx).save(&data.ctx)
}

fn component_deployment(data: &mut RunData) -> Result<()> {
    let entries = manifest::catalogue(&data.ctx);
    let status = ComponentDeployer::new(&data.ctx).deploy_all(&entries)?;

    ui::info(&format!(
        "Deployed {}/{} components",
        status.deployed_count(),
        entries.len()
    ));
    Ok(())
}

fn instruction_document(data: &mut RunData) -> Result<()> {
    match template::deploy_instruction_document(&data.ctx)? {
        DocOutcome::Written => ui::info("Instruction document deployed"),
        DocOutcome::PreservedUserOwned => {
            ui::info("Existing instruction document is user-owned; left untouched");
        }
    }
    Ok(())
}

fn platform_adaptation(data: &mut RunData) -> Result<()> {
    let adapter = PlatformAdapter::new(&data.ctx);
    let artifacts = adapter.adapt();

    ui::info(&format!(
        "Generated {} wrapper(s), {} PATH update(s)",
        artifacts.wrappers.len(),
        artifacts.path_injections.len()
    ));
    adapter.write_platform_config(&artifacts)
}

fn comprehensive_validation(data: &mut RunData) -> Result<()> {
    if data.skip_validation {
        ui::info("Validation skipped (OUTPOST_SKIP_VALIDATION)");
        return Ok(());
    }

    let checker = HealthChecker::new(&data.ctx);
    let health = checker.run();
    checker.persist(&health)?;

    if health.overall_health {
        ui::info("All validation checks passed");
    } else {
        for check in health.failing() {
            ui::warn(&format!("Check failed: {} ({})", check.check, check.detail));
        }
    }
    data.health = Some(health);
    Ok(())
}

fn installation_report(data: &mut RunData) -> Result<()> {
    let record =
        DiagnosticsRecord::collect(&data.ctx, &data.step_log, data.health.as_ref(), None);
    DiagnosticsReporter::new(&data.ctx).write_report(&record, data.health.as_ref())
}

/// Success path: the diagnostics record is the last artifact written
fn finalize_success(data: &RunData) {
    let record =
        DiagnosticsRecord::collect(&data.ctx, &data.step_log, data.health.as_ref(), None);
    if let Err(e) = DiagnosticsReporter::new(&data.ctx).write_diagnostics(&record) {
        ui::warn(&format!("Could not write diagnostics: {e}"));
    }
}

/// Critical-failure path: best-effort failure record, diagnostics, and
/// report, then a troubleshooting summary on the console
fn finalize_failure(data: &RunData, error: &OutpostError) {
    let record = DiagnosticsRecord::collect(
        &data.ctx,
        &data.step_log,
        data.health.as_ref(),
        Some(error.to_string()),
    );

    let reporter = DiagnosticsReporter::new(&data.ctx);
    for (what, result) in [
        ("failure record", reporter.write_failure(&record)),
        ("diagnostics", reporter.write_diagnostics(&record)),
        ("report", reporter.write_report(&record, data.health.as_ref())),
    ] {
        if let Err(e) = result {
            ui::warn(&format!("Could not write {what}: {e}"));
        }
    }

    let assessment = &record.partial_deployment_assessment;
    ui::error("Installation did not complete");
    if !assessment.present.is_empty() {
        ui::detail(&format!("Deployed before failure: {}", assessment.present.join(", ")));
    }
    if !assessment.missing.is_empty() {
        ui::detail(&format!("Still missing: {}", assessment.missing.join(", ")));
    }
    ui::detail(&format!(
        "See {} for details",
        data.ctx.paths.failure_file().display()
    ));
}
