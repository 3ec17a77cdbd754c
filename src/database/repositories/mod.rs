//! SeaORM repository implementations

pub mod tahap_progress;

pub use tahap_progress::TahapProgressSeaOrmRepository;
