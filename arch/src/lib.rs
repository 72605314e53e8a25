pub mod crc;
pub mod inst;
pub mod op;
pub mod profile;
