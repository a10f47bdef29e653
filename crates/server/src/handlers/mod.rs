//! HTTP request handlers.

pub mod about;
pub mod batch;
pub(crate) mod common;
pub mod health;
pub mod posts;
pub mod uploads;

pub use about::*;
pub use batch::*;
pub use health::*;
pub use posts::*;
pub use uploads::*;
