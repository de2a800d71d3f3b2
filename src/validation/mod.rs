pub mod structure;

pub use structure::StructureValidator;
