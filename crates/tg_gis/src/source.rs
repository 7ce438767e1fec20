// crates/tg_gis/src/source.rs

//! 数据来源描述
//!
//! 流水线的输入既可以是工作区内的数据集名称，也可以是已加载的内存对象。
//! 用带标签的枚举显式区分，取代按对象属性猜测类型的做法。

use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};
use tg_foundation::{TgError, TgResult};
use tg_raster::{ElevationGrid, ZoneGrid};

/// 数据类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// 栅格数据
    Raster,
    /// 矢量图层
    Layer,
}

impl DataKind {
    /// 解析类型标签（大小写不敏感）
    pub fn parse(tag: &str) -> TgResult<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "raster" => Ok(Self::Raster),
            "layer" | "vector" => Ok(Self::Layer),
            _ => Err(TgError::invalid_data_type(tag)),
        }
    }

    /// 标签名称
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Layer => "layer",
        }
    }
}

/// 高程数据来源
#[derive(Debug, Clone)]
pub enum ElevationSource {
    /// 工作区内的数据集名称
    Name(String),
    /// 已加载的高程栅格
    Grid(ElevationGrid),
}

impl From<&str> for ElevationSource {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ElevationSource {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<ElevationGrid> for ElevationSource {
    fn from(grid: ElevationGrid) -> Self {
        Self::Grid(grid)
    }
}

/// 影响区数据来源
#[derive(Debug, Clone)]
pub enum ZoneSource {
    /// 工作区内的数据集名称
    Name(String),
    /// 已加载的影响区栅格
    Grid(ZoneGrid),
}

impl From<&str> for ZoneSource {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ZoneSource {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<ZoneGrid> for ZoneSource {
    fn from(grid: ZoneGrid) -> Self {
        Self::Grid(grid)
    }
}

/// 矢量数据来源
#[derive(Debug, Clone)]
pub enum LayerSource {
    /// 工作区内的数据集名称
    Name(String),
    /// 已加载的要素表
    Table(FeatureTable),
}

impl From<&str> for LayerSource {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for LayerSource {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<FeatureTable> for LayerSource {
    fn from(table: FeatureTable) -> Self {
        Self::Table(table)
    }
}
