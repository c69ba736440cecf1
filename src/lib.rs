pub mod backup;
pub mod config;
pub mod content;
pub mod db;
pub mod importer;
pub mod ipc;
pub mod knowledge;
pub mod records;
pub mod sources;
pub mod store;
