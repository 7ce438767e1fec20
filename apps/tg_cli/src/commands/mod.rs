// apps/tg_cli/src/commands/mod.rs

//! 子命令实现

pub mod flood;
pub mod info;
pub mod scenarios;
