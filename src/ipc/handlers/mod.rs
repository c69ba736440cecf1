pub mod backup;
pub mod content;
pub mod core;
pub mod import;
pub mod knowledge;
