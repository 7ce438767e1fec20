// crates/tg_analysis/src/lib.rs

//! TideGates 淹没与影响分析
//!
//! 在 [`tg_gis::GeoWorkspace`] 之上实现淹没面积流水线和影响评估。
//!
//! # 模块
//!
//! - [`aggregate`]: 分区聚合（求和 / 去重计数）
//! - [`bridge`]: 栅格-矢量桥接封装
//! - [`flood`]: 淹没面积流水线
//! - [`impact`]: 湿地 / 建筑物影响评估

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod bridge;
pub mod flood;
pub mod impact;

// 重导出常用入口
pub use aggregate::{aggregate_by_group, Reducer, ValueField};
pub use flood::{flood_area, process_dem_and_zones, FloodGrids};
pub use impact::{assess_impact, area_of_impacts, count_of_impacts, ImpactOptions};
