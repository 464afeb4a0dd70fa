pub mod app;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod feed;
pub mod flash;
pub mod format;
pub mod generator;
pub mod table;
pub mod token;
pub mod ui;
