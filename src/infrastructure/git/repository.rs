use std::path::{Path, PathBuf};

use git2::{
    Branch, ErrorCode, Repository as Git2Repository, Signature, StatusOptions,
};
use tracing::{debug, warn};

use crate::domain::value_objects::identity::Identity;
use crate::infrastructure::git::remote;
use crate::infrastructure::scm::scm_interface::{
    HeadState, PushRequest, ScmError, StatusEntry, UpstreamInfo, WorkingCopy,
};

/// Wrapper around git2::Repository with high-level operations
pub struct GitRepository {
    /// The underlying git2 repository
    repo: Git2Repository,

    /// Working copy root
    path: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("path", &self.path)
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl GitRepository {
    /// Open an existing working copy (read-only until a mutating call is made)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScmError> {
        let path_buf = path.as_ref().to_path_buf();

        if !path_buf.exists() {
            return Err(ScmError::RepositoryNotFound {
                path: path_buf.display().to_string(),
            });
        }

        let repo = Git2Repository::open(&path_buf).map_err(|e| ScmError::InvalidRepository {
            path: path_buf.display().to_string(),
            message: e.message().to_string(),
        })?;

        if repo.is_bare() {
            return Err(ScmError::InvalidRepository {
                path: path_buf.display().to_string(),
                message: "bare repository has no working tree".to_string(),
            });
        }

        Ok(Self {
            repo,
            path: path_buf,
        })
    }

    /// Get repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the underlying git2 repository
    pub fn git2_repo(&self) -> &Git2Repository {
        &self.repo
    }

    fn status_options() -> StatusOptions {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .include_unreadable(true)
            .exclude_submodules(true);
        options
    }

    /// HEAD as a checked-out branch reference, or the reason it is not one.
    fn head_branch_ref(&self) -> Result<git2::Reference<'_>, ScmError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Err(ScmError::UnbornHead),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Err(ScmError::DetachedHead);
        }
        Ok(head)
    }
}

impl WorkingCopy for GitRepository {
    fn status_entries(&self) -> Result<Vec<StatusEntry>, ScmError> {
        let mut options = Self::status_options();
        let statuses = self
            .repo
            .statuses(Some(&mut options))
            .map_err(|e| ScmError::status_failed(e.message()))?;

        let mut entries = Vec::with_capacity(statuses.len());
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                warn!(
                    "Skipping non UTF-8 path in {}",
                    self.path.display()
                );
                continue;
            };
            entries.push(StatusEntry::new(path, entry.status().bits()));
        }
        Ok(entries)
    }

    fn head_state(&self) -> Result<HeadState, ScmError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(HeadState::Unborn),
            Err(e) => return Err(e.into()),
        };

        if !head.is_branch() {
            let commit = head.target().map(|oid| oid.to_string()).unwrap_or_default();
            return Ok(HeadState::Detached { commit });
        }

        let name = head.shorthand().unwrap_or("HEAD").to_string();
        let local_oid = head.peel_to_commit()?.id();
        let branch = Branch::wrap(head);

        let upstream = match branch.upstream() {
            Ok(upstream) => {
                let upstream_name = upstream.name()?.unwrap_or_default().to_string();
                let upstream_oid = upstream.get().peel_to_commit()?.id();
                let (ahead, behind) = self.repo.graph_ahead_behind(local_oid, upstream_oid)?;
                Some(UpstreamInfo {
                    name: upstream_name,
                    ahead,
                    behind,
                })
            }
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(HeadState::Branch { name, upstream })
    }

    fn update_index(&mut self, additions: &[String], removals: &[String]) -> Result<(), ScmError> {
        let mut index = self.repo.index()?;
        index.read(false)?;

        for path in additions {
            index
                .add_path(Path::new(path))
                .map_err(|e| ScmError::index_failed(format!("add {}: {}", path, e.message())))?;
        }
        for path in removals {
            index
                .remove_path(Path::new(path))
                .map_err(|e| ScmError::index_failed(format!("remove {}: {}", path, e.message())))?;
        }

        index.write()?;
        debug!(
            "Index of {} updated: {} added, {} removed",
            self.path.display(),
            additions.len(),
            removals.len()
        );
        Ok(())
    }

    fn commit_index(&mut self, message: &str, committer: &Identity) -> Result<String, ScmError> {
        let head = self.head_branch_ref()?;
        let head_name = head
            .name()
            .ok_or_else(|| ScmError::commit_failed("HEAD reference name is not valid UTF-8"))?
            .to_string();
        let parent = head.peel_to_commit()?;

        let mut index = self.repo.index()?;
        index.read(false)?;
        if index.has_conflicts() {
            return Err(ScmError::commit_failed("index has unresolved conflicts"));
        }

        let tree_oid = index.write_tree()?;
        if tree_oid == parent.tree_id() {
            return Err(ScmError::NothingToCommit);
        }
        let tree = self.repo.find_tree(tree_oid)?;

        let author = self.repo.signature().map_err(|e| ScmError::MissingIdentity {
            message: e.message().to_string(),
        })?;
        let committer = Signature::now(&committer.name, &committer.email)?;

        let oid = self.repo.commit(
            Some(&head_name),
            &author,
            &committer,
            message,
            &tree,
            &[&parent],
        )?;
        Ok(oid.to_string())
    }

    fn push_current_branch(&mut self, request: &PushRequest) -> Result<String, ScmError> {
        let head = self.head_branch_ref()?;
        let refname = head
            .name()
            .ok_or_else(|| ScmError::commit_failed("HEAD reference name is not valid UTF-8"))?
            .to_string();

        remote::push_reference(
            &self.repo,
            &request.remote,
            &refname,
            request.credentials.as_ref(),
        )?;
        Ok(refname)
    }
}

fn is_unborn(error: &git2::Error) -> bool {
    matches!(error.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}
