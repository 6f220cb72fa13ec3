//! Host capabilities consumed by the expansion core
//!
//! Everything that touches the operating system is injected through the
//! [`Host`] trait so the expander is fully unit-testable with a mock
//! filesystem and a mock subprocess. [`OsHost`] is the default
//! implementation wrapping the real OS.

use async_trait::async_trait;

use crate::error::Result;

/// One directory entry as seen by pathname expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Captured output of a command substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub stdout: String,
    pub status: i32,
}

/// Capabilities the core consumes from its environment.
#[async_trait]
pub trait Host: Send + Sync {
    /// Read a variable from the process environment. Used for the
    /// pre-shell-start seed and as the fallback for tilde's `HOME` / `PWD`
    /// / `OLDPWD` lookups.
    fn lookup_env(&self, name: &str) -> Option<String>;

    /// Home directory of a named user, for `~user` expansion.
    fn lookup_user_home(&self, user: &str) -> Option<String>;

    /// Entries of a directory, for pathname expansion. A missing or
    /// non-directory path yields an empty list; only a genuine read failure
    /// is an error.
    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Contents of a file, for the `.` builtin.
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Run a command and capture its standard output and exit status, for
    /// `$( ... )` and backtick substitution. May block on the child.
    async fn run_command_capture(&self, command: &str) -> Result<Capture>;
}

/// Host implementation backed by the real operating system.
#[derive(Debug, Default)]
pub struct OsHost;

impl OsHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Host for OsHost {
    fn lookup_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn lookup_user_home(&self, user: &str) -> Option<String> {
        // user:pass:uid:gid:gecos:home:shell
        let passwd = std::fs::read_to_string("/etc/passwd").ok()?;
        for line in passwd.lines() {
            let mut fields = line.split(':');
            if fields.next() == Some(user) {
                return fields.nth(4).map(str::to_string);
            }
        }
        None
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(path).await {
            Ok(dir) => dir,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(entries);
            }
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = dir.next_entry().await? {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }

    async fn run_command_capture(&self, command: &str) -> Result<Capture> {
        let output = tokio::process::Command::new("/bin/sh")
            .arg("-c")
            .arg(command)
            .output()
            .await?;
        Ok(Capture {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_dir_missing_path_is_empty() {
        let host = OsHost::new();
        let entries = host.read_dir("/no/such/dir/anywhere").await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn run_command_captures_stdout_and_status() {
        let host = OsHost::new();
        let cap = host.run_command_capture("echo hi; exit 3").await.unwrap();
        assert_eq!(cap.stdout, "hi\n");
        assert_eq!(cap.status, 3);
    }

    #[tokio::test]
    async fn read_dir_lists_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let host = OsHost::new();
        let mut entries = host.read_dir(dir.path().to_str().unwrap()).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert!(!entries[0].is_dir);
        assert!(entries[1].is_dir);
    }
}
