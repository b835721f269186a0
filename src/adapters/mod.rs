// Adapters layer: reading and writing records in the supported file formats.

pub mod records;
