/// Infrastructure layer modules
///
/// This layer provides concrete implementations for external system interactions:
/// - the version-control seam used by the core (`WorkingCopy`)
/// - Git operations through libgit2 (status, index, commit, push)
/// - File system operations (configuration file)
pub mod filesystem;
pub mod git;
pub mod scm;

// Re-export commonly used types
pub use filesystem::config_store::{AppConfig, ConfigStore, ConfigStoreError};
pub use git::{GitRepository, SshAgentCredentials};
pub use scm::scm_interface::{HeadState, PushRequest, ScmError, StatusEntry, WorkingCopy};
