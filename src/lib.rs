pub mod api;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod source;
pub mod survey;
pub mod ui;
