mod content;
mod normalize;
mod personas;

pub use content::{source_for, CategorySource, ContentStore, FileContentStore, StaticContentStore};
pub use normalize::{normalize, to_embeddable, MAX_EMBEDDING_CHARS};
pub use personas::PersonaStore;
