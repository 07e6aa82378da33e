pub mod bulk_actions;
pub mod classify_state;
pub mod discover_repositories;
pub mod sync_repositories;
