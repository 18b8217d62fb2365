use std::path::{Path, PathBuf};

/// Where the enclosing repository keeps its metadata.
#[derive(Debug, Clone)]
pub struct RepoContext {
    pub work_dir: PathBuf,
    pub git_dir: PathBuf,
}

impl RepoContext {
    /// The repository-local exclude file (`<git_dir>/info/exclude`).
    #[must_use]
    pub fn exclude_file(&self) -> PathBuf {
        self.git_dir.join("info").join("exclude")
    }
}

/// Find the git repository enclosing `project_root`, if any.
///
/// Discovery failures are not errors: a project outside a repository simply
/// has no repository-level excludes.
#[must_use]
pub fn discover_repo_context(project_root: &Path) -> Option<RepoContext> {
    let repo = match gix::discover(project_root) {
        Ok(repo) => repo,
        Err(error) => {
            tracing::debug!(root = %project_root.display(), %error, "no enclosing repository");
            return None;
        }
    };
    let work_dir = repo
        .work_dir()
        .map_or_else(|| project_root.to_path_buf(), Path::to_path_buf);
    Some(RepoContext {
        work_dir,
        git_dir: repo.git_dir().to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_directory_has_no_repo() {
        let tmp = tempfile::tempdir().unwrap();
        // A tempdir may still sit inside some repository on a developer
        // machine; only assert when discovery finds nothing at all.
        if let Some(ctx) = discover_repo_context(tmp.path()) {
            assert!(!ctx.work_dir.starts_with(tmp.path()));
        }
    }

    #[test]
    fn exclude_file_lives_under_info() {
        let ctx = RepoContext {
            work_dir: PathBuf::from("/w"),
            git_dir: PathBuf::from("/w/.git"),
        };
        assert_eq!(ctx.exclude_file(), PathBuf::from("/w/.git/info/exclude"));
    }
}
