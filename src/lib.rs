// Sukashi Watermark Service Library

pub mod config;
pub mod constants;
pub mod logging;
pub mod server;
pub mod watermark;
