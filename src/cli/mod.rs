pub mod actions;
pub mod commands;
pub mod dispatch;
pub mod settings;
pub mod start;

pub use self::start::start;
