//! Repository layer
//!
//! Storage is accessed only through [`StageRepository`]; the SeaORM
//! implementation lives in `crate::database::repositories`.

pub mod in_memory;
pub mod traits;

pub use in_memory::InMemoryStageRepository;
pub use traits::StageRepository;
