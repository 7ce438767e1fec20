// crates/tg_gis/src/lib.rs

//! TideGates GIS 数据集管理
//!
//! 要素表、地理处理环境和工作区抽象。分析层通过 [`GeoWorkspace`]
//! trait 使用 GIS 能力，默认实现为 [`MemoryWorkspace`]。
//!
//! # 模块
//!
//! - [`field`]: 属性字段类型与值
//! - [`table`]: 要素表
//! - [`source`]: 数据来源描述
//! - [`env`]: 环境状态与 RAII 守卫
//! - [`workspace`]: 工作区 trait 与数据集类型
//! - [`memory`]: 内存工作区实现

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod env;
pub mod field;
pub mod memory;
pub mod source;
pub mod table;
pub mod workspace;

// 重导出常用类型
pub use env::{ExtensionGuard, GisEnv, OverwriteGuard, WorkspaceGuard};
pub use field::{FieldType, FieldValue};
pub use memory::MemoryWorkspace;
pub use source::{DataKind, ElevationSource, LayerSource, ZoneSource};
pub use table::{Feature, FeatureTable, FieldDef};
pub use workspace::{Dataset, GeoWorkspace, Raster};
