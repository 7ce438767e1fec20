// crates/tg_scenario/src/lib.rs

//! TideGates 情景枚举与批处理编排
//!
//! 在 [`tg_analysis`] 的淹没流水线之上做两件事：
//!
//! - [`scenario`]: 标准（风暴潮 × 海平面上升）与自定义洪水位的情景模型
//! - [`orchestrator`]: 整批情景的串行执行、结果合并与清理
//!
//! 典型用法：从 JSON 反序列化一份 [`FloodBatch`]，调用
//! [`FloodBatch::run`] 跑完全部情景。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod orchestrator;
pub mod scenario;

// 重导出常用入口
pub use orchestrator::{BatchOutputs, FloodBatch};
pub use scenario::{enumerate, surge_offset, Scenario, SEALEVELRISE_FT, SURGES};
