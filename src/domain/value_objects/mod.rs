pub mod change_category;
pub mod identity;
pub mod status_flags;

pub use change_category::ChangeCategory;
pub use identity::{Identity, IdentityError};
pub use status_flags::{StatusFlagCodec, StatusFlags};
