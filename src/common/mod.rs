pub mod counter;
pub mod crc_ops;
pub mod field_ops;
pub mod frame;
pub mod validation;
