mod conversation;
mod generation;
mod knowledge;
mod persona;
mod retrieval;

pub use conversation::*;
pub use generation::*;
pub use knowledge::*;
pub use persona::*;
pub use retrieval::*;
