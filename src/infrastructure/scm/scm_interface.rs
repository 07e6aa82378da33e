use crate::domain::value_objects::identity::Identity;
use crate::infrastructure::git::remote::CredentialSource;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Operations the core needs from one opened working copy.
///
/// A handle is owned by exactly one [`Repository`](crate::domain::entities::repository::Repository)
/// and only ever used from one worker at a time, so implementations need to be
/// `Send` but not `Sync`. Mutating operations take `&mut self` to keep index
/// updates, commit creation and pushes on the same repository serialized.
#[cfg_attr(test, mockall::automock)]
pub trait WorkingCopy: Send {
    /// Full working-tree/index/HEAD comparison, one entry per changed path.
    fn status_entries(&self) -> Result<Vec<StatusEntry>, ScmError>;

    /// Where HEAD points and how the checked-out branch compares to its upstream.
    fn head_state(&self) -> Result<HeadState, ScmError>;

    /// Add and remove paths in the index, then write the index once.
    fn update_index(&mut self, additions: &[String], removals: &[String]) -> Result<(), ScmError>;

    /// Commit the current index tree on top of HEAD.
    ///
    /// The author is the repository's configured identity, the committer is
    /// `committer`. Returns the new commit id.
    fn commit_index(&mut self, message: &str, committer: &Identity) -> Result<String, ScmError>;

    /// Push the checked-out branch. Returns the pushed reference name.
    fn push_current_branch(&mut self, request: &PushRequest) -> Result<String, ScmError>;
}

/// One changed path and its raw status bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Path relative to the working copy root
    pub path: String,
    /// Raw status value as reported by the backend
    pub raw: u32,
}

impl StatusEntry {
    pub fn new(path: impl Into<String>, raw: u32) -> Self {
        Self {
            path: path.into(),
            raw,
        }
    }
}

/// HEAD of a working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeadState {
    /// A local branch is checked out
    Branch {
        name: String,
        upstream: Option<UpstreamInfo>,
    },
    /// HEAD points directly at a commit
    Detached { commit: String },
    /// The current branch has no commits yet
    Unborn,
}

impl HeadState {
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            HeadState::Branch { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn upstream(&self) -> Option<&UpstreamInfo> {
        match self {
            HeadState::Branch { upstream, .. } => upstream.as_ref(),
            _ => None,
        }
    }
}

/// Comparison of a local branch against its tracking branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamInfo {
    /// Upstream branch name, e.g. `origin/main`
    pub name: String,
    /// Commits on the local branch missing from the upstream
    pub ahead: usize,
    /// Commits on the upstream missing from the local branch
    pub behind: usize,
}

/// What to push and how to authenticate.
#[derive(Clone)]
pub struct PushRequest {
    /// Remote name, usually `origin`
    pub remote: String,
    /// Credential provider consulted by the transport
    pub credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for PushRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushRequest")
            .field("remote", &self.remote)
            .field("user", &self.credentials.username())
            .finish()
    }
}

/// Errors that can occur during SCM operations
#[derive(Debug, thiserror::Error)]
pub enum ScmError {
    #[error("Repository not found at path: {path}")]
    RepositoryNotFound { path: String },

    #[error("Not a usable working copy at {path}: {message}")]
    InvalidRepository { path: String, message: String },

    #[error("Status check failed: {message}")]
    StatusFailed { message: String },

    #[error("Index update failed: {message}")]
    IndexFailed { message: String },

    #[error("Commit failed: {message}")]
    CommitFailed { message: String },

    #[error("Nothing to commit")]
    NothingToCommit,

    #[error("HEAD is detached")]
    DetachedHead,

    #[error("Current branch has no commits yet")]
    UnbornHead,

    #[error("No author identity configured: {message}")]
    MissingIdentity { message: String },

    #[error("Remote not found: {name}")]
    RemoteNotFound { name: String },

    #[error("Push rejected: {message}")]
    PushRejected { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

impl ScmError {
    /// Create a status failed error
    pub fn status_failed(message: impl Into<String>) -> Self {
        Self::StatusFailed {
            message: message.into(),
        }
    }

    /// Create an index failed error
    pub fn index_failed(message: impl Into<String>) -> Self {
        Self::IndexFailed {
            message: message.into(),
        }
    }

    /// Create a commit failed error
    pub fn commit_failed(message: impl Into<String>) -> Self {
        Self::CommitFailed {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network_error(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Create an authentication failed error
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_state_accessors() {
        let head = HeadState::Branch {
            name: "main".to_string(),
            upstream: Some(UpstreamInfo {
                name: "origin/main".to_string(),
                ahead: 2,
                behind: 0,
            }),
        };
        assert_eq!(head.branch_name(), Some("main"));
        assert_eq!(head.upstream().map(|u| u.ahead), Some(2));

        let detached = HeadState::Detached {
            commit: "abc123".to_string(),
        };
        assert_eq!(detached.branch_name(), None);
        assert!(detached.upstream().is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ScmError::NothingToCommit.to_string(), "Nothing to commit");
        assert_eq!(
            ScmError::RemoteNotFound {
                name: "origin".to_string()
            }
            .to_string(),
            "Remote not found: origin"
        );
    }
}
