pub use super::tahap_progress::Entity as TahapProgress;
