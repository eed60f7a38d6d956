//! Caches of fetched data for UI consumption

pub mod compounds;
pub mod form;
pub mod formulations;
pub mod study_data_suppliers;

pub use compounds::CompoundsStore;
pub use form::FormStore;
pub use formulations::FormulationsStore;
pub use study_data_suppliers::StudyDataSuppliersStore;
