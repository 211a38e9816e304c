//! Content root discovery.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::constants::{BUILD_OUTPUT_SEGMENTS, CONTENT_ROOT_VAR};
use crate::environment::env_var_or_none;

/// Returns the directory that contains the `Config` folder.
///
/// `STRONGBOX_CONTENT_ROOT` wins when set. Otherwise the executable's
/// directory is used, cut back to the parent of its outermost `bin` or
/// `target` segment so binaries run from a build tree find the project root.
pub fn discover_content_root() -> Result<PathBuf, anyhow::Error> {
    if let Some(root) = env_var_or_none(CONTENT_ROOT_VAR) {
        return Ok(PathBuf::from(root));
    }

    let exe = std::env::current_exe().context("Failed to determine the current executable")?;
    let dir = exe
        .parent()
        .context("Executable path has no parent directory")?;
    Ok(strip_build_output(dir))
}

/// Cuts `dir` back to the parent of its outermost build-output segment.
pub fn strip_build_output(dir: &Path) -> PathBuf {
    dir.ancestors()
        .filter(|ancestor| {
            ancestor
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    BUILD_OUTPUT_SEGMENTS
                        .iter()
                        .any(|segment| name.eq_ignore_ascii_case(segment))
                })
        })
        .last()
        .and_then(Path::parent)
        .unwrap_or(dir)
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_strip_build_output() {
        assert_eq!(
            strip_build_output(Path::new("/srv/app/target/debug/deps")),
            PathBuf::from("/srv/app")
        );
        assert_eq!(
            strip_build_output(Path::new("/srv/app/bin/Release")),
            PathBuf::from("/srv/app")
        );
        assert_eq!(
            strip_build_output(Path::new("/srv/app/target/bin")),
            PathBuf::from("/srv/app")
        );
        assert_eq!(
            strip_build_output(Path::new("/srv/app")),
            PathBuf::from("/srv/app")
        );
    }

    #[test]
    #[serial]
    fn test_env_var_wins() {
        temp_env::with_var(CONTENT_ROOT_VAR, Some("/opt/content"), || {
            assert_eq!(
                discover_content_root().unwrap(),
                PathBuf::from("/opt/content")
            );
        });
    }

    #[test]
    #[serial]
    fn test_falls_back_to_executable_location() {
        temp_env::with_var_unset(CONTENT_ROOT_VAR, || {
            let root = discover_content_root().unwrap();
            let exe = std::env::current_exe().unwrap();
            assert!(exe.starts_with(&root));
            // Test binaries live under target/, which is stripped.
            assert!(!root.components().any(|c| c.as_os_str() == "target"));
        });
    }
}
