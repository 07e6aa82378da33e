pub mod remote;
pub mod repository;

// Re-export main types for convenience
pub use remote::{push_reference, CredentialSource, SshAgentCredentials};
pub use repository::GitRepository;
