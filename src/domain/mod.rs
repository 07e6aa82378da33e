/// Domain layer
///
/// Repository state as the rest of the crate sees it: per-file change
/// categories, the derived dirty/staged/ahead flags and the registry.
pub mod entities;
pub mod value_objects;
