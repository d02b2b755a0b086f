pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod image_input;
pub mod storage;
pub mod view;
