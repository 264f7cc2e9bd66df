pub mod mapping;
pub mod store;

pub use store::{Association, AssociationTable, Entity, EntityTable, Store, UniqueKey};
