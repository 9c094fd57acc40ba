pub mod commands;
pub mod config;
pub mod dispatch;
pub mod impala;
pub mod logging;
pub mod process;
pub mod validation;
