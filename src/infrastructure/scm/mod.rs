/// Version-control seam used by the application layer
///
/// The core only talks to working copies through [`WorkingCopy`], so tests
/// can substitute a mock for the git2 implementation.
pub mod scm_interface;

pub use scm_interface::{HeadState, PushRequest, ScmError, StatusEntry, UpstreamInfo, WorkingCopy};
