//! The component catalogue for one deployment run

use std::path::PathBuf;

use crate::context::{COMPONENT_NAMES, DeploymentContext};

/// One named, independently deployable unit of the distribution
#[derive(Debug, Clone)]
pub struct ComponentManifest {
    pub name: &'static str,
    /// Bundled source directory; absent sources get a synthesized default
    pub source: Option<PathBuf>,
    pub target: PathBuf,
    /// Required components failing to deploy fail the deployment step
    pub required: bool,
}

/// Build the catalogue against the extracted package tree
///
/// Sources are same-named directories under the package root. A missing
/// directory is recorded as an absent source, never as an error.
pub fn catalogue(ctx: &DeploymentContext) -> Vec<ComponentManifest> {
    COMPONENT_NAMES
        .iter()
        .map(|name| {
            let source_dir = ctx.package_root.join(name);
            ComponentManifest {
                name,
                source: source_dir.is_dir().then_some(source_dir),
                target: ctx.paths.component(name),
                required: matches!(*name, "framework" | "cli"),
            }
        })
        .collect()
}
