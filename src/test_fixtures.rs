//! Shared fixtures for unit tests

use std::path::Path;

use crate::context::{DeploymentContext, DeploymentPaths};
use crate::platform::PlatformProfile;
use crate::platform::detection::InstallType;

/// Build a context rooted in a temporary home directory
///
/// The package root points at `<home>/package`, which tests populate (or
/// leave absent to exercise the synthesized-default paths).
pub fn context_with_home(home: &Path) -> DeploymentContext {
    #[allow(clippy::unwrap_used)]
    let profile = PlatformProfile::current(Some(home.to_path_buf())).unwrap();

    DeploymentContext {
        profile,
        install_type: InstallType::Local,
        detection_rules: Vec::new(),
        package_root: home.join("package"),
        paths: DeploymentPaths::new(home),
        framework_version: "0.7.5".to_string(),
        verbose: false,
    }
}
