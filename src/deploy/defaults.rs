//! Synthesized default artifacts for components missing from the package
//!
//! An absent source never aborts a deployment; each component has a
//! generator that writes a minimal but structurally valid stand-in, so
//! the deployed tree always has the same shape.

use std::path::Path;

use crate::context::AGENT_TIERS;
use crate::error::{OutpostError, Result};

/// Write the default artifact for `name` into its target directory
pub fn synthesize(name: &str, target: &Path) -> Result<()> {
    crate::common::fs::ensure_dir(target)?;
    match name {
        "framework" => framework_default(target),
        "agents" => agents_default(target),
        "schemas" => schemas_default(target),
        "config" => config_default(target),
        "cli" => cli_default(target),
        _ => readme_default(name, target),
    }
}

fn write(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| OutpostError::write(path, e))
}

fn framework_default(target: &Path) -> Result<()> {
    write(&target.join("VERSION"), env!("CARGO_PKG_VERSION"))?;
    write(
        &target.join("README.md"),
        "# Outpost framework\n\n\
         The bundled framework sources were not included in this package.\n\
         Reinstall the outpost package to restore them.\n",
    )
}

/// Three-tier agent skeleton plus the roles directory
fn agents_default(target: &Path) -> Result<()> {
    for tier in AGENT_TIERS {
        crate::common::fs::ensure_dir(&target.join(tier))?;
    }
    write(
        &target.join("README.md"),
        "# Agent definitions\n\n\
         - `system/`: agents shipped with the framework\n\
         - `user-defined/`: agents you author, shared across projects\n\
         - `project-specific/`: agents scoped to a single project\n\
         - `roles/`: role descriptions referenced by agent definitions\n",
    )
}

fn schemas_default(target: &Path) -> Result<()> {
    write(
        &target.join("agent-definition.schema.json"),
        r#"{
  "$schema": "http://json-schema.org/draft-07/schema#",
  "title": "Agent definition",
  "type": "object",
  "required": ["name", "role"],
  "properties": {
    "name": { "type": "string" },
    "role": { "type": "string" },
    "capabilities": { "type": "array", "items": { "type": "string" } }
  }
}
"#,
    )
}

fn config_default(target: &Path) -> Result<()> {
    write(
        &target.join("defaults.json"),
        r#"{
  "orchestration": { "maxConcurrentAgents": 4 },
  "logging": { "level": "info" }
}
"#,
    )
}

/// Placeholder CLI entrypoint; the generated wrappers exec this file
fn cli_default(target: &Path) -> Result<()> {
    write(
        &target.join("outpost.js"),
        "#!/usr/bin/env node\n\
         // Placeholder entrypoint written because the package shipped no CLI\n\
         // component. The wrappers in bin/ exec this file.\n\
         console.error('outpost: the bundled CLI was not included in this package.');\n\
         console.error('Reinstall the outpost package, or run bin/outpost-doctor.');\n\
         process.exit(1);\n",
    )
}

fn readme_default(name: &str, target: &Path) -> Result<()> {
    write(
        &target.join("README.md"),
        &format!(
            "# {name}\n\n\
             Placeholder created at install time; the package shipped no\n\
             `{name}` component.\n"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_agents_default_creates_tier_skeleton() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("agents");

        synthesize("agents", &target).unwrap();

        for tier in AGENT_TIERS {
            assert!(target.join(tier).is_dir());
        }
        assert!(target.join("README.md").is_file());
    }

    #[test]
    fn test_schemas_default_is_valid_json() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("schemas");

        synthesize("schemas", &target).unwrap();

        let content =
            std::fs::read_to_string(target.join("agent-definition.schema.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["title"], "Agent definition");
    }

    #[test]
    fn test_cli_default_provides_wrapper_entrypoint() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("cli");

        synthesize("cli", &target).unwrap();

        assert!(target.join("outpost.js").is_file());
    }

    #[test]
    fn test_unknown_component_gets_readme() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("docs");

        synthesize("docs", &target).unwrap();

        assert!(target.join("README.md").is_file());
    }
}
