pub mod config;
pub mod console;
pub mod logging;
pub mod serial;
pub mod storage;
pub mod terminal;
