pub mod admin;
pub mod conversation;
pub(crate) mod health;
pub mod persona;
pub mod search;

pub use health::health_check;
