//! Script template functions, one per platform family and artifact
//!
//! Each function returns plain script text and performs no filesystem
//! side effects; the [`adapter`](super::adapter) writes the results.

use std::path::Path;

use crate::context::COMPONENT_NAMES;

/// Marker appended to lines this tool writes into shell config files
pub const PATH_LINE_MARKER: &str = "# outpost-postinstall";

/// POSIX wrapper: change into the deployment directory, exec the CLI
pub fn unix_wrapper(deploy_dir: &Path) -> String {
    let dir = deploy_dir.display();
    format!(
        "#!/bin/sh\n\
         # Outpost launcher (generated by outpost-postinstall)\n\
         OUTPOST_HOME=\"{dir}\"\n\
         cd \"$OUTPOST_HOME\" || exit 1\n\
         exec node \"$OUTPOST_HOME/cli/outpost.js\" \"$@\"\n"
    )
}

/// Batch wrapper: change into the deployment directory, forward all args
pub fn windows_wrapper(deploy_dir: &Path) -> String {
    let dir = deploy_dir.display();
    format!(
        "@echo off\r\n\
         rem Outpost launcher (generated by outpost-postinstall)\r\n\
         cd /d \"{dir}\"\r\n\
         node \"{dir}\\cli\\outpost.js\" %*\r\n"
    )
}

/// POSIX health-check script: re-verifies component presence and the node
/// runtime, independently of this installer
pub fn unix_health_check(deploy_dir: &Path) -> String {
    let dir = deploy_dir.display();
    let mut script = String::from(
        "#!/bin/sh\n\
         # Outpost installation doctor (generated by outpost-postinstall)\n\
         status=0\n",
    );
    for name in COMPONENT_NAMES {
        script.push_str(&format!(
            "if [ -d \"{dir}/{name}\" ]; then\n\
             \x20 echo \"ok   {name}\"\n\
             else\n\
             \x20 echo \"MISSING {name}\"\n\
             \x20 status=1\n\
             fi\n"
        ));
    }
    script.push_str(
        "if command -v node >/dev/null 2>&1; then\n\
         \x20 echo \"ok   node runtime\"\n\
         else\n\
         \x20 echo \"MISSING node runtime\"\n\
         \x20 status=1\n\
         fi\n\
         exit $status\n",
    );
    script
}

/// Batch health-check script, mirroring [`unix_health_check`]
pub fn windows_health_check(deploy_dir: &Path) -> String {
    let dir = deploy_dir.display();
    let mut script = String::from(
        "@echo off\r\n\
         rem Outpost installation doctor (generated by outpost-postinstall)\r\n\
         set STATUS=0\r\n",
    );
    for name in COMPONENT_NAMES {
        script.push_str(&format!(
            "if exist \"{dir}\\{name}\\\" (echo ok   {name}) else (echo MISSING {name} & set STATUS=1)\r\n"
        ));
    }
    script.push_str(
        "where node >nul 2>nul\r\n\
         if %ERRORLEVEL%==0 (echo ok   node runtime) else (echo MISSING node runtime & set STATUS=1)\r\n\
         exit /b %STATUS%\r\n",
    );
    script
}

/// Shell-config line extending PATH with the deployed bin directory
pub fn path_export_line(bin_dir: &Path) -> String {
    format!(
        "export PATH=\"{}:$PATH\" {}",
        bin_dir.display(),
        PATH_LINE_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_unix_wrapper_changes_into_deploy_dir() {
        let script = unix_wrapper(&PathBuf::from("/home/u/.outpost"));

        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("OUTPOST_HOME=\"/home/u/.outpost\""));
        assert!(script.contains("cd \"$OUTPOST_HOME\""));
        assert!(script.contains("exec node"));
        assert!(script.contains("\"$@\""));
    }

    #[test]
    fn test_windows_wrapper_forwards_args() {
        let script = windows_wrapper(&PathBuf::from("C:\\Users\\u\\.outpost"));

        assert!(script.starts_with("@echo off\r\n"));
        assert!(script.contains("cd /d \"C:\\Users\\u\\.outpost\""));
        assert!(script.contains("%*"));
    }

    #[test]
    fn test_unix_health_check_covers_all_components() {
        let script = unix_health_check(&PathBuf::from("/home/u/.outpost"));

        for name in COMPONENT_NAMES {
            assert!(script.contains(&format!("/home/u/.outpost/{name}")));
        }
        assert!(script.contains("command -v node"));
        assert!(script.ends_with("exit $status\n"));
    }

    #[test]
    fn test_windows_health_check_covers_all_components() {
        let script = windows_health_check(&PathBuf::from("C:\\u\\.outpost"));

        for name in COMPONENT_NAMES {
            assert!(script.contains(&format!("C:\\u\\.outpost\\{name}")));
        }
        assert!(script.contains("where node"));
    }

    #[test]
    fn test_path_export_line_is_marked() {
        let line = path_export_line(&PathBuf::from("/home/u/.outpost/bin"));
        assert_eq!(
            line,
            "export PATH=\"/home/u/.outpost/bin:$PATH\" # outpost-postinstall"
        );
    }
}
