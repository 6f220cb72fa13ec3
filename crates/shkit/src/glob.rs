//! Pathname expansion
//!
//! Walks a slash-separated pattern against the filesystem one component at
//! a time, matching each component with the pattern matcher under the
//! `pathname` and `period` flags. Directory contents come from the injected
//! [`Host`] so the walk is testable without touching the real OS.
//!
//! An empty result means "no match": the caller keeps the original field
//! verbatim.

use crate::error::Result;
use crate::host::Host;
use crate::pattern::{self, MatchFlags};

/// Expand `pattern` against the filesystem, returning matching paths in
/// byte-lexicographic order. `.` and `..` entries are never produced.
pub async fn expand_pathnames(host: &dyn Host, pattern: &str) -> Result<Vec<String>> {
    let absolute = pattern.starts_with('/');
    let trimmed = pattern.trim_start_matches('/');
    // A trailing slash restricts matches to directories.
    let dirs_only = trimmed.ends_with('/');
    let components: Vec<&str> = trimmed
        .split('/')
        .filter(|c| !c.is_empty())
        .collect();
    if components.is_empty() {
        return Ok(Vec::new());
    }

    let root = if absolute { "/" } else { "." };
    let mut results = Vec::new();
    walk(host, root, &components, dirs_only, &mut results).await?;
    results.sort_unstable();
    Ok(results)
}

/// Match the leading component of `components` inside `dir`, recursing for
/// the rest.
async fn walk(
    host: &dyn Host,
    dir: &str,
    components: &[&str],
    dirs_only: bool,
    out: &mut Vec<String>,
) -> Result<()> {
    let component = components[0];
    let rest = &components[1..];
    let last = rest.is_empty();
    let need_dir = !last || dirs_only;

    if !pattern::has_glob_chars(component) {
        // Literal component: confirm it exists rather than matching the
        // whole directory against it.
        let name = pattern::unescape(component);
        if name == "." || name == ".." {
            // Never enumerated, but a literal . / .. step is always valid.
            let path = join(dir, &name);
            if last {
                out.push(finish(&path, dirs_only));
            } else {
                Box::pin(walk(host, &path, rest, dirs_only, out)).await?;
            }
            return Ok(());
        }
        let entries = host.read_dir(dir).await?;
        if let Some(entry) = entries.iter().find(|e| e.name == name) {
            if need_dir && !entry.is_dir {
                return Ok(());
            }
            let path = join(dir, &name);
            if last {
                out.push(finish(&path, dirs_only));
            } else {
                Box::pin(walk(host, &path, rest, dirs_only, out)).await?;
            }
        }
        return Ok(());
    }

    let flags = MatchFlags::for_pathnames();
    for entry in host.read_dir(dir).await? {
        if entry.name == "." || entry.name == ".." {
            continue;
        }
        if need_dir && !entry.is_dir {
            continue;
        }
        if !pattern::matches(component, &entry.name, flags) {
            continue;
        }
        let path = join(dir, &entry.name);
        if last {
            out.push(finish(&path, dirs_only));
        } else {
            Box::pin(walk(host, &path, rest, dirs_only, out)).await?;
        }
    }
    Ok(())
}

fn join(dir: &str, name: &str) -> String {
    match dir {
        "." => name.to_string(),
        "/" => format!("/{name}"),
        _ => format!("{dir}/{name}"),
    }
}

fn finish(path: &str, dirs_only: bool) -> String {
    if dirs_only {
        format!("{path}/")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Capture, DirEntry};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Host double with a fixed directory tree and no subprocess support.
    struct TreeHost {
        dirs: HashMap<String, Vec<DirEntry>>,
    }

    impl TreeHost {
        fn new(tree: &[(&str, &[(&str, bool)])]) -> Self {
            let dirs = tree
                .iter()
                .map(|(dir, entries)| {
                    (
                        dir.to_string(),
                        entries
                            .iter()
                            .map(|(name, is_dir)| DirEntry {
                                name: name.to_string(),
                                is_dir: *is_dir,
                            })
                            .collect(),
                    )
                })
                .collect();
            Self { dirs }
        }
    }

    #[async_trait]
    impl Host for TreeHost {
        fn lookup_env(&self, _name: &str) -> Option<String> {
            None
        }

        fn lookup_user_home(&self, _user: &str) -> Option<String> {
            None
        }

        async fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
            Ok(self.dirs.get(path).cloned().unwrap_or_default())
        }

        async fn read_file(&self, _path: &str) -> Result<String> {
            unreachable!("glob never reads files")
        }

        async fn run_command_capture(&self, _command: &str) -> Result<Capture> {
            unreachable!("glob never runs commands")
        }
    }

    fn sample() -> TreeHost {
        TreeHost::new(&[
            (
                ".",
                &[
                    ("a.txt", false),
                    ("b.txt", false),
                    (".hidden", false),
                    ("sub", true),
                ],
            ),
            ("sub", &[("c.txt", false), ("d.log", false)]),
            ("/", &[("etc", true), ("tmp", true)]),
            ("/etc", &[("hosts", false), ("passwd", false)]),
        ])
    }

    #[tokio::test]
    async fn star_matches_sorted_and_skips_dotfiles() {
        let host = sample();
        let paths = expand_pathnames(&host, "*.txt").await.unwrap();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        let all = expand_pathnames(&host, "*").await.unwrap();
        assert_eq!(all, vec!["a.txt", "b.txt", "sub"]);
    }

    #[tokio::test]
    async fn explicit_dot_pattern_matches_hidden() {
        let host = sample();
        let paths = expand_pathnames(&host, ".*").await.unwrap();
        assert_eq!(paths, vec![".hidden"]);
    }

    #[tokio::test]
    async fn multi_component_walk() {
        let host = sample();
        let paths = expand_pathnames(&host, "sub/*.txt").await.unwrap();
        assert_eq!(paths, vec!["sub/c.txt"]);
        let paths = expand_pathnames(&host, "*/*.log").await.unwrap();
        assert_eq!(paths, vec!["sub/d.log"]);
    }

    #[tokio::test]
    async fn absolute_patterns() {
        let host = sample();
        let paths = expand_pathnames(&host, "/etc/h*").await.unwrap();
        assert_eq!(paths, vec!["/etc/hosts"]);
        let paths = expand_pathnames(&host, "/*").await.unwrap();
        assert_eq!(paths, vec!["/etc", "/tmp"]);
    }

    #[tokio::test]
    async fn no_match_is_empty() {
        let host = sample();
        let paths = expand_pathnames(&host, "*.xyz").await.unwrap();
        assert!(paths.is_empty());
        let paths = expand_pathnames(&host, "nodir/*.txt").await.unwrap();
        assert!(paths.is_empty());
    }

    #[tokio::test]
    async fn trailing_slash_requires_directory() {
        let host = sample();
        let paths = expand_pathnames(&host, "*/").await.unwrap();
        assert_eq!(paths, vec!["sub/"]);
    }

    #[tokio::test]
    async fn escaped_metachars_match_literally() {
        let host = TreeHost::new(&[(".", &[("*.txt", false), ("x.txt", false)])]);
        let paths = expand_pathnames(&host, r"\*.txt").await.unwrap();
        assert_eq!(paths, vec!["*.txt"]);
    }
}
