//! The persisted deployment record (`config.json`)
//!
//! Created on the first run, mutated by read-modify-write after every
//! deployment and validation step, never deleted automatically. The file
//! outlives the run: the framework CLI reads it to locate components.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::common::json;
use crate::context::DeploymentContext;
use crate::error::Result;
use crate::platform::detection::InstallType;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStatus {
    pub deployed: bool,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub version: String,
    pub install_type: InstallType,
    pub install_date: String,
    pub platform: String,
    pub package_root: PathBuf,
    pub deployment_paths: BTreeMap<String, PathBuf>,
    pub components: BTreeMap<String, ComponentStatus>,
    #[serde(default)]
    pub validation: BTreeMap<String, bool>,
}

impl DeploymentConfig {
    /// Load the existing record, or initialize a fresh one
    ///
    /// An unreadable or corrupted file is replaced rather than aborting
    /// the run. Reruns keep the original install date; everything else is
    /// refreshed from the current context.
    pub fn load_or_init(ctx: &DeploymentContext) -> Self {
        let existing: Option<DeploymentConfig> =
            json::read_json(&ctx.paths.config_file()).ok();

        let mut config = Self::fresh(ctx);
        if let Some(previous) = existing {
            config.install_date = previous.install_date;
            config.components = previous.components;
        }
        config
    }

    fn fresh(ctx: &DeploymentContext) -> Self {
        let mut deployment_paths: BTreeMap<String, PathBuf> = ctx
            .paths
            .components()
            .into_iter()
            .map(|(name, path)| (name.to_string(), path))
            .collect();
        deployment_paths.insert("bin".to_string(), ctx.paths.bin());

        Self {
            version: ctx.framework_version.clone(),
            install_type: ctx.install_type,
            install_date: chrono::Utc::now().to_rfc3339(),
            platform: ctx.profile.os_name.clone(),
            package_root: ctx.package_root.clone(),
            deployment_paths,
            components: BTreeMap::new(),
            validation: BTreeMap::new(),
        }
    }

    pub fn save(&self, ctx: &DeploymentContext) -> Result<()> {
        json::write_json(&ctx.paths.config_file(), self)
    }

    /// Read-modify-write a single component's status
    pub fn update_component(
        ctx: &DeploymentContext,
        name: &str,
        status: ComponentStatus,
    ) -> Result<()> {
        let mut config = Self::load_or_init(ctx);
        config.components.insert(name.to_string(), status);
        config.save(ctx)
    }

    /// Read-modify-write the validation outcome map
    pub fn record_validation(
        ctx: &DeploymentContext,
        checks: &BTreeMap<String, bool>,
    ) -> Result<()> {
        let mut config = Self::load_or_init(ctx);
        config.validation = checks.clone();
        config.save(ctx)
    }
}
