//! # gitstat - survey and sync a fleet of git working copies
//!
//! `gitstat` finds every git working copy below a set of root directories, shows
//! which of them have uncommitted, staged or unpushed work, and applies stage,
//! commit and push to a selection of them in parallel.
//!
//! ## Features
//!
//! - **Discovery**: Walk glob-expanded roots and register each working copy by directory name
//! - **Classification**: Derive dirty/staged/ahead flags from libgit2 status bits
//! - **Selection**: Pick repositories by list number, name, `.`, `all` or fuzzy text
//! - **Bulk Actions**: Stage, commit and push across repositories with bounded parallelism
//!
//! ## Quick Start
//!
//! ```bash
//! # list every repository with its flags
//! gitstat --list
//!
//! # stage, commit and push everything that needs it in the "notes" repository
//! gitstat -s notes -m "daily notes"
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: Repository entities, the registry and status value objects
//! - [`application`]: Discovery, classification, selection and bulk actions
//! - [`infrastructure`]: libgit2 access, SSH push and configuration storage
//! - [`presentation`]: CLI interface and terminal output
//! - [`common`]: Shared error handling
//!
//! ## Error Handling
//!
//! - [`common::error::GitstatError`]: Error type of the configuration and output layers
//! - [`common::result::GitstatResult`]: Type alias for `Result<T, GitstatError>`
//!
//! Per-repository failures never abort a run. They are reported as
//! [`application::use_cases::bulk_actions::ActionOutcome::Failed`] entries.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use gitstat::application::use_cases::classify_state::StateClassifier;
//! use gitstat::application::use_cases::discover_repositories::{
//!     DiscoveryConfig, RepositoryDiscovery,
//! };
//!
//! # async fn example() {
//! let discovery = RepositoryDiscovery::new(
//!     DiscoveryConfig::new(vec!["~/src/*".to_string()]).with_max_depth(4),
//! );
//! let mut result = discovery.discover().await;
//! StateClassifier::new(4).classify(&mut result.registry).await;
//!
//! for summary in result.registry.summaries() {
//!     println!("{} dirty={} ahead={}", summary.id, summary.dirty, summary.ahead);
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use crate::common::error::GitstatError;
pub use crate::common::result::GitstatResult as Result;
