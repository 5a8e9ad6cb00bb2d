//! Navigation operations implementation

use crate::error::{ServiceError, ServiceResult};
use crate::navigate::results::CwdResult;
use crate::storage::PathSandbox;
use log::debug;

/// Resolves the target of a directory change inside the sandbox
pub fn change_directory(sandbox: &PathSandbox, target_path: &str) -> ServiceResult<CwdResult> {
    let real_path = sandbox.resolve(target_path);
    let virtual_path = sandbox.display(&real_path);

    if !real_path.is_dir() {
        return Err(ServiceError::NotFound(format!(
            "{virtual_path}: no such directory"
        )));
    }

    debug!("Resolved {:?} to {}", target_path, real_path.display());
    Ok(CwdResult {
        virtual_path,
        real_path,
    })
}

/// Root-relative rendering of the sandbox's current directory
pub fn print_working_directory(sandbox: &PathSandbox) -> String {
    sandbox.display(sandbox.cwd())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn change_into_existing_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/b")).unwrap();
        let sandbox = PathSandbox::new(tmp.path(), tmp.path());

        let result = change_directory(&sandbox, "a/b").unwrap();
        assert_eq!(result.virtual_path, "/a/b");
        assert_eq!(result.real_path, tmp.path().join("a/b"));
    }

    #[test]
    fn missing_and_file_targets_not_found() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("f"), b"x").unwrap();
        let sandbox = PathSandbox::new(tmp.path(), tmp.path());

        assert!(matches!(
            change_directory(&sandbox, "nope"),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            change_directory(&sandbox, "f"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn escape_lands_on_root() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        let sandbox = PathSandbox::new(tmp.path(), &tmp.path().join("a"));

        assert_eq!(print_working_directory(&sandbox), "/a");
        let result = change_directory(&sandbox, "../../../..").unwrap();
        assert_eq!(result.virtual_path, "/");
        assert_eq!(result.real_path, sandbox.root());
    }
}
