//! Data models for SmartLPD

mod detection;
mod fine;
mod user;

pub use detection::*;
pub use fine::*;
pub use user::*;
