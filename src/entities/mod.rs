//! SeaORM entities

pub mod prelude;

pub mod tahap_progress;
