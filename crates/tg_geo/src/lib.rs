// crates/tg_geo/src/lib.rs

//! TideGates 平面几何
//!
//! 提供淹没分析所需的最小几何能力。坐标统一为投影坐标（米），
//! 不做坐标系/投影处理（由上游 GIS 数据准备负责）。
//!
//! # 模块
//!
//! - [`geometry`]: 点、多边形、多边形集合
//! - [`clip`]: 凸裁剪与图层求交
//! - [`spatial_index`]: R-tree 包围盒索引

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clip;
pub mod geometry;
pub mod spatial_index;

// 重导出常用类型
pub use geometry::{MultiPolygon, Point2D, Polygon};
pub use spatial_index::{BoundingBox, SpatialIndex};
