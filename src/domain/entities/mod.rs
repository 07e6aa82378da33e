pub mod registry;
pub mod repository;

pub use registry::RegistryView;
pub use repository::{Classification, FileChange, Repository, RepositorySummary};
