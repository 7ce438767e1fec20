// crates/tg_foundation/src/lib.rs

//! TideGates Foundation Layer
//!
//! 基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`units`]: 英尺/米单位换算
//! - [`naming`]: 中间文件命名约定
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror 和 chrono
//! 2. **可定位错误**: 错误信息必须指出出错的字段/路径/取值
//! 3. **上层复用**: 跨层错误分类集中于此，各业务 crate 不再自定义错误枚举

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod naming;
pub mod units;

// 重导出常用类型
pub use error::{TgError, TgResult};
pub use units::{feet_to_meters, METERS_PER_FOOT};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{TgError, TgResult};
    pub use crate::naming::{temp_name, TEMP_PREFIX};
    pub use crate::units::{feet_to_meters, meters_to_feet, METERS_PER_FOOT};
    pub use crate::{ensure, require};
}
