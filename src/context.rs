//! Deployment context shared by all pipeline stages
//!
//! The context is built once from the CLI arguments and the detected
//! environment, then passed by reference between stages. No stage holds
//! ambient or global state.

use std::path::{Path, PathBuf};

use crate::error::{OutpostError, Result};
use crate::platform::PlatformProfile;
use crate::platform::detection::{self, InstallType, RuleOutcome};

/// Dot-directory under the user home that receives the deployment tree
pub const DEPLOY_DIR_NAME: &str = ".outpost";

/// The component catalogue, in deployment order
pub const COMPONENT_NAMES: [&str; 8] = [
    "framework",
    "scripts",
    "templates",
    "agents",
    "schemas",
    "config",
    "cli",
    "docs",
];

/// Agent definition tiers created under `agents/`
pub const AGENT_TIERS: [&str; 4] = ["system", "user-defined", "project-specific", "roles"];

/// Resolved locations inside the deployment tree
#[derive(Debug, Clone)]
pub struct DeploymentPaths {
    root: PathBuf,
}

impl DeploymentPaths {
    pub fn new(home_dir: &Path) -> Self {
        Self {
            root: home_dir.join(DEPLOY_DIR_NAME),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn component(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// All catalogue components with their target directories
    pub fn components(&self) -> Vec<(&'static str, PathBuf)> {
        COMPONENT_NAMES
            .iter()
            .map(|name| (*name, self.component(name)))
            .collect()
    }

    /// Wrapper/script directory; created by the platform adapter, not a
    /// catalogue component
    pub fn bin(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn agent_tiers(&self) -> Vec<PathBuf> {
        AGENT_TIERS
            .iter()
            .map(|tier| self.component("agents").join(tier))
            .collect()
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn platform_config_file(&self) -> PathBuf {
        self.root.join("platform-config.json")
    }

    pub fn component_validation_file(&self) -> PathBuf {
        self.root.join("component-validation.json")
    }

    pub fn health_check_file(&self) -> PathBuf {
        self.root.join("health-check.json")
    }

    pub fn diagnostics_file(&self) -> PathBuf {
        self.root.join("installation-diagnostics.json")
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join("installation-report.md")
    }

    pub fn failure_file(&self) -> PathBuf {
        self.root.join("installation-failure.json")
    }

    /// The framework's root instruction document
    pub fn instruction_document(&self) -> PathBuf {
        self.root.join("OUTPOST.md")
    }
}

/// Everything the pipeline stages need to know about this run
#[derive(Debug, Clone)]
pub struct DeploymentContext {
    pub profile: PlatformProfile,
    pub install_type: InstallType,
    /// Individual detection rule outcomes, kept for diagnostics
    pub detection_rules: Vec<RuleOutcome>,
    pub package_root: PathBuf,
    pub paths: DeploymentPaths,
    pub framework_version: String,
    pub verbose: bool,
}

impl DeploymentContext {
    /// Resolve the context for the current process
    pub fn resolve(
        package_root: Option<PathBuf>,
        home_dir: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        let package_root = match package_root {
            Some(root) => root,
            None => std::env::current_dir().map_err(|e| OutpostError::FileReadFailed {
                path: ".".to_string(),
                reason: e.to_string(),
            })?,
        };
        // dunce avoids \\?\ verbatim prefixes on Windows; an unresolvable
        // root is kept as given so detection can still inspect the string
        let package_root =
            dunce::canonicalize(&package_root).unwrap_or(package_root);

        let profile = PlatformProfile::current(home_dir)?;
        let detection = detection::classify_install(&package_root);
        let paths = DeploymentPaths::new(&profile.home_dir);
        let framework_version = read_package_version(&package_root)
            .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

        Ok(Self {
            profile,
            install_type: detection.install_type,
            detection_rules: detection.rules,
            package_root,
            paths,
            framework_version,
            verbose,
        })
    }
}

/// Read the distribution version from the package manifest, if present
fn read_package_version(package_root: &Path) -> Option<String> {
    let manifest = package_root.join("package.json");
    let content = std::fs::read_to_string(manifest).ok()?;
    let value: serde_json::Value = serde_json::from_str(&content).ok()?;
    value
        .get("version")
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deployment_paths_layout() {
        let paths = DeploymentPaths::new(Path::new("/home/u"));

        assert_eq!(paths.root(), Path::new("/home/u/.outpost"));
        assert_eq!(paths.component("agents"), Path::new("/home/u/.outpost/agents"));
        assert_eq!(paths.bin(), Path::new("/home/u/.outpost/bin"));
        assert_eq!(paths.components().len(), 8);
        assert_eq!(paths.agent_tiers().len(), 4);
    }

    #[test]
    fn test_resolve_reads_package_version() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(
            pkg.join("package.json"),
            r#"{"name": "outpost", "version": "1.2.3"}"#,
        )
        .unwrap();

        let ctx = DeploymentContext::resolve(
            Some(pkg),
            Some(temp.path().join("home")),
            false,
        )
        .unwrap();
        assert_eq!(ctx.framework_version, "1.2.3");
    }

    #[test]
    fn test_resolve_falls_back_to_crate_version() {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("pkg");
        std::fs::create_dir_all(&pkg).unwrap();

        let ctx = DeploymentContext::resolve(
            Some(pkg),
            Some(temp.path().join("home")),
            false,
        )
        .unwrap();
        assert_eq!(ctx.framework_version, env!("CARGO_PKG_VERSION"));
    }
}
