//! Placeholder template rendering and the root instruction document
//!
//! Placeholders use `{{NAME}}` syntax. Substitution is global and
//! order-independent (placeholder names are disjoint). Unresolved
//! placeholders stay verbatim so a partially-known context still produces
//! a usable document.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::context::DeploymentContext;
use crate::error::{OutpostError, Result};
use crate::platform::Family;

/// Signature marking a document as managed by this tool.
///
/// A target file without this marker is user-owned and never overwritten.
pub const DOC_SIGNATURE: &str = "<!-- outpost:managed -->";

/// Replace every `{{NAME}}` occurrence for each provided variable
pub fn render(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        // Escape the name before building the pattern; NoExpand keeps
        // `$` sequences in values (Windows paths) literal
        let pattern = format!(r"\{{\{{{}\}}\}}", regex::escape(name));
        if let Ok(re) = regex::Regex::new(&pattern) {
            out = re
                .replace_all(&out, regex::NoExpand(value.as_str()))
                .into_owned();
        }
    }
    out
}

/// What happened to the instruction document on this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocOutcome {
    Written,
    /// Target exists without the managed signature; left untouched
    PreservedUserOwned,
}

/// Render and deploy the root instruction document into the tree
pub fn deploy_instruction_document(ctx: &DeploymentContext) -> Result<DocOutcome> {
    let target = ctx.paths.instruction_document();

    if target.exists() {
        let existing =
            std::fs::read_to_string(&target).map_err(|e| OutpostError::read(&target, e))?;
        if !existing.contains(DOC_SIGNATURE) {
            return Ok(DocOutcome::PreservedUserOwned);
        }
    }

    let source = ctx.package_root.join("framework").join("OUTPOST.md");
    let template = if source.is_file() {
        std::fs::read_to_string(&source).map_err(|e| OutpostError::read(&source, e))?
    } else {
        fallback_template()
    };

    let rendered = render(&template, &instruction_variables(ctx));
    std::fs::write(&target, rendered).map_err(|e| OutpostError::write(&target, e))?;
    Ok(DocOutcome::Written)
}

/// Variables available to the instruction document
pub fn instruction_variables(ctx: &DeploymentContext) -> BTreeMap<String, String> {
    let now = Utc::now();
    let version = &ctx.framework_version;

    let mut vars = BTreeMap::new();
    vars.insert("FRAMEWORK_VERSION".to_string(), version.clone());
    vars.insert("DOC_REVISION".to_string(), format!("{version}-001"));
    vars.insert("DEPLOYMENT_DATE".to_string(), now.to_rfc3339());
    vars.insert(
        "DEPLOYMENT_DIR".to_string(),
        ctx.paths.root().display().to_string(),
    );
    vars.insert("PLATFORM".to_string(), ctx.profile.os_name.clone());
    vars.insert("NODE_CMD".to_string(), node_command());
    vars.insert("TASKTRACK_PATH".to_string(), tasktrack_path());
    vars.insert(
        "DEPLOYMENT_ID".to_string(),
        now.timestamp().to_string(),
    );
    vars.insert(
        "PLATFORM_NOTES".to_string(),
        platform_notes(ctx.profile.family, &ctx.profile.os_name).to_string(),
    );
    vars
}

/// Interpreter command for the framework runtime
fn node_command() -> String {
    for candidate in ["node", "nodejs"] {
        if which::which(candidate).is_ok() {
            return candidate.to_string();
        }
    }
    "node".to_string()
}

/// Path to the companion task-tracking CLI, or the documented fallback
fn tasktrack_path() -> String {
    match which::which("tasktrack") {
        Ok(path) => path.display().to_string(),
        Err(_) => "tasktrack (not installed - task tracking disabled)".to_string(),
    }
}

/// One of three fixed notes blocks, keyed by platform
fn platform_notes(family: Family, os_name: &str) -> &'static str {
    match (family, os_name) {
        (Family::Windows, _) => {
            "- Wrapper scripts use .cmd batch files; run them from cmd.exe or PowerShell.\n\
             - PATH changes are not applied automatically; add the bin directory manually.\n\
             - Use forward slashes in project configuration files."
        }
        (Family::Unix, "macos") => {
            "- Wrapper scripts live in the bin directory and are added to PATH via your shell profile.\n\
             - On Apple Silicon, Homebrew installs node under /opt/homebrew.\n\
             - Restart your terminal after installation to pick up PATH changes."
        }
        (Family::Unix, _) => {
            "- Wrapper scripts live in the bin directory and are added to PATH via your shell profile.\n\
             - Under WSL, Windows-side node installations appear beneath /mnt/<drive>.\n\
             - Restart your shell after installation to pick up PATH changes."
        }
    }
}

/// Built-in template used when the distribution ships no instruction
/// document
pub fn fallback_template() -> String {
    format!(
        "{DOC_SIGNATURE}\n\
         # Outpost Framework\n\n\
         Version: {{{{FRAMEWORK_VERSION}}}} (document revision {{{{DOC_REVISION}}}})\n\
         Deployed: {{{{DEPLOYMENT_DATE}}}} (deployment id {{{{DEPLOYMENT_ID}}}})\n\
         Location: {{{{DEPLOYMENT_DIR}}}}\n\
         Platform: {{{{PLATFORM}}}}\n\
         Runtime: {{{{NODE_CMD}}}}\n\
         Task tracking: {{{{TASKTRACK_PATH}}}}\n\n\
         ## Platform notes\n\n\
         {{{{PLATFORM_NOTES}}}}\n\n\
         ## Getting started\n\n\
         Run `outpost --help` (or the short alias `ost`) from any terminal.\n\
         Agent definitions live under `agents/` in the deployment directory.\n"
    )
}
