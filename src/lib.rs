pub mod ai;
pub mod app;
pub mod draw;
pub mod geometry;
pub mod gui;
pub mod logging;
pub mod notes;
pub mod pdf;
pub mod settings;
pub mod storage;
pub mod toast_log;
pub mod window_manager;
