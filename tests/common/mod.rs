//! Shared helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// An isolated home + package root pair for one test
pub struct TestHome {
    temp: TempDir,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp.path().join("home")).expect("Failed to create home");
        std::fs::create_dir_all(temp.path().join("package")).expect("Failed to create package");
        Self { temp }
    }

    pub fn home(&self) -> PathBuf {
        self.temp.path().join("home")
    }

    pub fn package_root(&self) -> PathBuf {
        self.temp.path().join("package")
    }

    pub fn deploy_root(&self) -> PathBuf {
        self.home().join(".outpost")
    }

    /// Write a package.json so the installer picks up a distribution version
    pub fn with_package_version(&self, version: &str) -> &Self {
        std::fs::write(
            self.package_root().join("package.json"),
            format!(r#"{{"name": "outpost", "version": "{version}"}}"#),
        )
        .expect("Failed to write package.json");
        self
    }

    /// Populate a bundled component directory under the package root
    pub fn add_component_file(&self, component: &str, rel: &str, content: &str) {
        let path = self.package_root().join(component).join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create component dir");
        }
        std::fs::write(path, content).expect("Failed to write component file");
    }

    /// Command pointed at this home, isolated from the host npm environment
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("outpost-postinstall").expect("binary builds");
        cmd.arg("--home-dir")
            .arg(self.home())
            .arg("--package-root")
            .arg(self.package_root())
            .env_remove("npm_config_prefix")
            .env_remove("npm_config_globaldir")
            .env_remove("npm_root")
            .env_remove("OUTPOST_SKIP_VALIDATION");
        cmd
    }

    pub fn read_json(&self, rel: &str) -> serde_json::Value {
        let path = self.deploy_root().join(rel);
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Invalid JSON in {}: {e}", path.display()))
    }

    pub fn read_deployed(&self, rel: &str) -> String {
        let path = self.deploy_root().join(rel);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    }
}

pub fn wrapper_name(base: &str) -> String {
    if cfg!(windows) {
        format!("{base}.cmd")
    } else {
        base.to_string()
    }
}

/// The component directories every successful run must materialize
pub const COMPONENTS: [&str; 8] = [
    "framework",
    "scripts",
    "templates",
    "agents",
    "schemas",
    "config",
    "cli",
    "docs",
];

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

/// A path under the deployment root exists
pub fn assert_deployed(home: &TestHome, rel: &str) {
    assert!(
        home.deploy_root().join(rel).exists(),
        "expected {rel} under {}",
        home.deploy_root().display()
    );
}
