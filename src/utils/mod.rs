pub mod color;
pub mod file_kind;
pub mod file_size;
