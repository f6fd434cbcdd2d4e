//! 配置管理
//!
//! 加载顺序：config.toml -> config.{APP_ENV}.toml -> ATTENDSYSTEM_* 环境变量
//! -> 若干常用环境变量（DATABASE_URL、JWT_SECRET 等）。

mod r#impl;
mod structs;

pub use structs::*;
