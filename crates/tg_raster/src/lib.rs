// crates/tg_raster/src/lib.rs

//! TideGates 栅格数据模型
//!
//! 高程栅格、潮闸影响区栅格与淹没掩膜计算。
//!
//! # 模块
//!
//! - [`template`]: 栅格空间模板
//! - [`grid`]: 高程栅格与影响区栅格
//! - [`flood`]: 淹没掩膜

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod flood;
pub mod grid;
pub mod template;

// 重导出常用类型
pub use flood::flood_mask;
pub use grid::{ElevationGrid, ZoneGrid, NODATA};
pub use template::GridTemplate;
