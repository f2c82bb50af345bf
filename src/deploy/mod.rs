//! Component deployment into the user-level tree
//!
//! For each catalogued component: ensure the target directory, copy the
//! bundled source (or synthesize a default when absent), then
//! read-modify-write the component's status in `config.json`. One
//! component failing never stops the rest; failures surface in validation
//! and diagnostics.

pub mod defaults;
pub mod manifest;

use serde::Serialize;

use crate::common::{fs as fsops, json};
use crate::config::{ComponentStatus, DeploymentConfig};
use crate::context::DeploymentContext;
use crate::error::{OutpostError, Result};
use crate::ui;

use manifest::ComponentManifest;

/// Where a deployed component's content came from
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentOrigin {
    Bundled,
    Synthesized,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOutcome {
    pub name: String,
    pub deployed: bool,
    pub origin: Option<ComponentOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one deployment pass
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub outcomes: Vec<ComponentOutcome>,
}

impl DeploymentStatus {
    pub fn deployed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.deployed).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ComponentOutcome> {
        self.outcomes.iter().filter(|o| !o.deployed)
    }
}

pub struct ComponentDeployer<'a> {
    ctx: &'a DeploymentContext,
}

impl<'a> ComponentDeployer<'a> {
    pub fn new(ctx: &'a DeploymentContext) -> Self {
        Self { ctx }
    }

    /// Deploy every catalogued component, tolerating per-component failure
    ///
    /// Errors only when a required component fails or nothing at all could
    /// be deployed; either case fails the critical deployment step.
    pub fn deploy_all(&self, entries: &[ComponentManifest]) -> Result<DeploymentStatus> {
        let mut status = DeploymentStatus::default();

        for entry in entries {
            let outcome = match self.deploy_component(entry) {
                Ok(origin) => ComponentOutcome {
                    name: entry.name.to_string(),
                    deployed: true,
                    origin: Some(origin),
                    error: None,
                },
                Err(e) => {
                    ui::warn(&format!("Component '{}' failed: {e}", entry.name));
                    ComponentOutcome {
                        name: entry.name.to_string(),
                        deployed: false,
                        origin: None,
                        error: Some(e.to_string()),
                    }
                }
            };

            // Status is persisted after every component so a later crash
            // still leaves an accurate partial record
            let record = ComponentStatus {
                deployed: outcome.deployed,
                version: self.ctx.framework_version.clone(),
            };
            if let Err(e) = DeploymentConfig::update_component(self.ctx, entry.name, record) {
                ui::warn(&format!(
                    "Could not record status for '{}': {e}",
                    entry.name
                ));
            }

            status.outcomes.push(outcome);
        }

        self.write_component_validation(&status);

        if status.deployed_count() == 0 {
            return Err(OutpostError::NothingDeployed);
        }
        if let Some(failed_required) = entries
            .iter()
            .filter(|e| e.required)
            .find_map(|e| status.failed().find(|o| o.name == e.name))
        {
            return Err(OutpostError::ComponentDeployFailed {
                name: failed_required.name.clone(),
                reason: failed_required
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            });
        }

        Ok(status)
    }

    fn deploy_component(&self, entry: &ComponentManifest) -> Result<ComponentOrigin> {
        fsops::ensure_dir(&entry.target)?;

        match &entry.source {
            Some(source) => {
                fsops::copy_dir_recursive(
                    source,
                    &entry.target,
                    &fsops::CopyOptions::exclude_package_noise(),
                )
                .map_err(|e| OutpostError::CopyFailed {
                    src_path: source.display().to_string(),
                    target: entry.target.display().to_string(),
                    reason: e.to_string(),
                })?;
                Ok(ComponentOrigin::Bundled)
            }
            None => {
                defaults::synthesize(entry.name, &entry.target)?;
                Ok(ComponentOrigin::Synthesized)
            }
        }
    }

    fn write_component_validation(&self, status: &DeploymentStatus) {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ComponentValidation<'a> {
            timestamp: String,
            components: &'a [ComponentOutcome],
        }

        let record = ComponentValidation {
            timestamp: chrono::Utc::now().to_rfc3339(),
            components: &status.outcomes,
        };
        if let Err(e) = json::write_json(&self.ctx.paths.component_validation_file(), &record) {
            ui::warn(&format!("Could not write component validation: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::COMPONENT_NAMES;
    use crate::test_fixtures::context_with_home;
    use tempfile::TempDir;

    #[test]
    fn test_deploy_all_synthesizes_missing_sources() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let entries = manifest::catalogue(&ctx);
        let status = ComponentDeployer::new(&ctx).deploy_all(&entries).unwrap();

        assert_eq!(status.deployed_count(), 8);
        assert!(
            status
                .outcomes
                .iter()
                .all(|o| o.origin == Some(ComponentOrigin::Synthesized))
        );
        for name in COMPONENT_NAMES {
            assert!(ctx.paths.component(name).is_dir());
        }
    }

    #[test]
    fn test_deploy_all_copies_bundled_sources() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let scripts_src = ctx.package_root.join("scripts");
        std::fs::create_dir_all(scripts_src.join("hooks")).unwrap();
        std::fs::write(scripts_src.join("sync.sh"), "#!/bin/sh\n").unwrap();
        std::fs::write(scripts_src.join("hooks/pre.sh"), "#!/bin/sh\n").unwrap();

        let entries = manifest::catalogue(&ctx);
        let status = ComponentDeployer::new(&ctx).deploy_all(&entries).unwrap();

        let scripts = status
            .outcomes
            .iter()
            .find(|o| o.name == "scripts")
            .unwrap();
        assert_eq!(scripts.origin, Some(ComponentOrigin::Bundled));
        assert!(ctx.paths.component("scripts").join("sync.sh").is_file());
        assert!(
            ctx.paths
                .component("scripts")
                .join("hooks/pre.sh")
                .is_file()
        );
    }

    #[test]
    fn test_deploy_records_status_in_config() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let entries = manifest::catalogue(&ctx);
        ComponentDeployer::new(&ctx).deploy_all(&entries).unwrap();

        let config = DeploymentConfig::load_or_init(&ctx);
        assert_eq!(config.components.len(), 8);
        assert!(config.components["framework"].deployed);
        assert_eq!(config.components["framework"].version, "0.7.5");
    }

    #[test]
    fn test_deploy_writes_component_validation_record() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let entries = manifest::catalogue(&ctx);
        ComponentDeployer::new(&ctx).deploy_all(&entries).unwrap();

        let content =
            std::fs::read_to_string(ctx.paths.component_validation_file()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["components"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_rerun_overwrites_component_files() {
        let temp = TempDir::new().unwrap();
        let ctx = context_with_home(temp.path());
        std::fs::create_dir_all(ctx.paths.root()).unwrap();

        let docs_src = ctx.package_root.join("docs");
        std::fs::create_dir_all(&docs_src).unwrap();
        std::fs::write(docs_src.join("guide.md"), "v1").unwrap();

        let entries = manifest::catalogue(&ctx);
        let deployer = ComponentDeployer::new(&ctx);
        deployer.deploy_all(&entries).unwrap();

        std::fs::write(docs_src.join("guide.md"), "v2").unwrap();
        deployer.deploy_all(&entries).unwrap();

        let deployed = ctx.paths.component("docs").join("guide.md");
        assert_eq!(std::fs::read_to_string(deployed).unwrap(), "v2");
    }
}
