//! Key path resolution and delegation to ssh-add

use std::convert::Infallible;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ClientError, Result};

/// Resolve a key argument to the path handed to ssh-add.
///
/// An existing filesystem entry is taken as-is; anything else is assumed to
/// name a key under `$HOME/.ssh`. No existence check on the constructed
/// path: the delegated tool reports missing keys itself.
pub fn resolve_key_path(home: &Path, fragment: &str) -> PathBuf {
    let candidate = Path::new(fragment);
    if candidate.exists() {
        return candidate.to_path_buf();
    }
    home.join(".ssh").join(fragment)
}

/// Replace this process with `program -- <resolved keys...>`.
///
/// Terminal action: on success control never returns here; the `Ok` type is
/// uninhabited so callers can only observe the failure case.
pub fn add_keys(program: &Path, keys: &[String]) -> Result<Infallible> {
    let home = home_dir().ok_or(ClientError::NoHomeDir)?;
    let resolved: Vec<PathBuf> = keys
        .iter()
        .map(|fragment| resolve_key_path(&home, fragment))
        .collect();

    let err = Command::new(program).arg("--").args(&resolved).exec();
    Err(ClientError::DelegateLaunchFailed {
        program: program.display().to_string(),
        source: err,
    })
}

/// Replace this process with `program -l` to list loaded fingerprints.
pub fn list_keys(program: &Path) -> Result<Infallible> {
    let err = Command::new(program).arg("-l").exec();
    Err(ClientError::DelegateLaunchFailed {
        program: program.display().to_string(),
        source: err,
    })
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_resolve_under_dot_ssh() {
        let home = Path::new("/home/aerin");
        assert_eq!(
            resolve_key_path(home, "id_rsa"),
            PathBuf::from("/home/aerin/.ssh/id_rsa")
        );
    }

    #[test]
    fn existing_paths_are_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("deploy_key");
        std::fs::write(&key, "---").unwrap();

        let resolved = resolve_key_path(Path::new("/home/aerin"), &key.to_string_lossy());
        assert_eq!(resolved, key);
    }

    #[test]
    fn missing_delegate_fails_with_the_os_error() {
        let err = match add_keys(Path::new("/nonexistent/ssh-add"), &["id_rsa".to_string()]) {
            Err(e) => e,
            Ok(never) => match never {},
        };
        match err {
            ClientError::DelegateLaunchFailed { program, source } => {
                assert_eq!(program, "/nonexistent/ssh-add");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
