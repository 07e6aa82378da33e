pub mod list;
pub mod sync;

pub use list::*;
pub use sync::*;
