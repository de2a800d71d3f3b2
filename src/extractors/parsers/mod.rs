// File format parsers shared by the extractors

pub mod env_file;
