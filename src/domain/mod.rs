pub mod dispatch;
pub mod scenario;

pub use dispatch::*;
pub use scenario::*;
