//! v1 API Data Transfer Objects.
//!
//! Wire format for the v1 REST API, kept apart from the domain models in
//! `src/models/`. Field names are camelCase on the wire.

pub mod admin;
pub mod conversation;
pub mod persona;
pub mod search;

pub use admin::*;
pub use conversation::*;
pub use persona::*;
pub use search::*;
