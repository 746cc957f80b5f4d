pub mod actor;
pub mod events;
pub mod pii;

pub use actor::{Actor, Role};
pub use pii::Masked;
