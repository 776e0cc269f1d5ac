pub mod json_codec;
pub mod json_file;
pub mod memory;
