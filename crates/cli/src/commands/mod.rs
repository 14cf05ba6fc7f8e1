pub mod aidl;
pub mod program;
pub mod providers;
pub mod signature;
pub mod util;

pub use aidl::*;
pub use program::*;
pub use providers::*;
pub use signature::*;
pub use util::*;
