/// Application layer
///
/// Use cases driving discovery, classification and the bulk
/// stage/commit/push pipeline, plus the selection services.
pub mod services;
pub mod use_cases;
