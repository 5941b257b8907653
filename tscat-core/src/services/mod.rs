pub mod ai;
pub mod ai_types;
pub mod atomic;
pub mod catalog_file;
pub mod config;
pub mod encoding;
pub mod merge;
pub mod pipeline;
pub mod placeholder;
pub mod qa;
pub mod rebuild;
pub mod stats;
pub mod translation_memory;
