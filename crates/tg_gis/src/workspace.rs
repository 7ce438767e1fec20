// crates/tg_gis/src/workspace.rs

//! 地理处理工作区抽象
//!
//! [`GeoWorkspace`] 定义淹没分析所需的全部 GIS 能力：
//! 数据集存取 + 七个地理处理操作。分析层只依赖该 trait，
//! 不关心底层是内存引擎还是外部 GIS。

use crate::env::GisEnv;
use crate::source::DataKind;
use crate::table::FeatureTable;
use serde::{Deserialize, Serialize};
use tg_foundation::{TgError, TgResult};
use tg_raster::{ElevationGrid, GridTemplate, ZoneGrid};

/// 栅格数据集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Raster {
    /// 分类栅格（潮闸影响区 / 淹没掩膜）
    Zones(ZoneGrid),
    /// 连续栅格（高程）
    Elevation(ElevationGrid),
}

/// 工作区数据集
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    /// 栅格
    Raster(Raster),
    /// 矢量图层
    Vector(FeatureTable),
}

impl Dataset {
    /// 数据集的类型标签
    #[must_use]
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Raster(_) => DataKind::Raster,
            Self::Vector(_) => DataKind::Layer,
        }
    }
}

/// 地理处理工作区
pub trait GeoWorkspace: Send + Sync {
    /// 工作区环境
    fn env(&self) -> &GisEnv;

    /// 数据集是否存在
    fn exists(&self, name: &str) -> bool;

    /// 取出数据集，不存在时返回 [`TgError::DataNotFound`]
    fn fetch(&self, name: &str) -> TgResult<Dataset>;

    /// 存入数据集
    ///
    /// 同名数据集已存在且环境未开启覆盖时返回 [`TgError::OutputExists`]。
    fn store(&self, name: &str, data: Dataset) -> TgResult<()>;

    /// 删除数据集（不存在时静默成功）
    fn delete(&self, name: &str) -> TgResult<()>;

    /// 列出所有数据集名称（升序）
    fn list(&self) -> Vec<String>;

    // ------------------------------------------------------------------
    // 按类型存取
    // ------------------------------------------------------------------

    /// 按影响区栅格取出
    fn fetch_zones(&self, name: &str) -> TgResult<ZoneGrid> {
        match self.fetch(name)? {
            Dataset::Raster(Raster::Zones(g)) => Ok(g),
            _ => Err(TgError::load_failure(name, "zone raster")),
        }
    }

    /// 按高程栅格取出
    fn fetch_elevation(&self, name: &str) -> TgResult<ElevationGrid> {
        match self.fetch(name)? {
            Dataset::Raster(Raster::Elevation(g)) => Ok(g),
            _ => Err(TgError::load_failure(name, "elevation raster")),
        }
    }

    /// 按矢量图层取出
    fn fetch_table(&self, name: &str) -> TgResult<FeatureTable> {
        match self.fetch(name)? {
            Dataset::Vector(t) => Ok(t),
            _ => Err(TgError::load_failure(name, "layer")),
        }
    }

    /// 存入影响区栅格
    fn store_zones(&self, name: &str, grid: ZoneGrid) -> TgResult<()> {
        self.store(name, Dataset::Raster(Raster::Zones(grid)))
    }

    /// 存入高程栅格
    fn store_elevation(&self, name: &str, grid: ElevationGrid) -> TgResult<()> {
        self.store(name, Dataset::Raster(Raster::Elevation(grid)))
    }

    /// 存入矢量图层（以表名为数据集名）
    fn store_table(&self, table: FeatureTable) -> TgResult<()> {
        let name = table.name.clone();
        self.store(&name, Dataset::Vector(table))
    }

    // ------------------------------------------------------------------
    // 地理处理操作
    // ------------------------------------------------------------------

    /// 多边形图层栅格化
    ///
    /// 像元中心落入某要素的几何内即取该要素 `id_field` 的值；
    /// 未覆盖的像元为 0。`id_field` 必须是长整型字段。
    fn polygons_to_raster(
        &self,
        table: &FeatureTable,
        id_field: &str,
        cell_size: f64,
    ) -> TgResult<ZoneGrid>;

    /// 高程栅格重采样到给定模板（最近邻）
    ///
    /// 模板外或源栅格未覆盖的像元为 NODATA。
    fn clip_raster(&self, elevation: &ElevationGrid, template: &GridTemplate)
        -> TgResult<ElevationGrid>;

    /// 分类栅格矢量化
    ///
    /// 每个正值像元连段生成一个矩形要素，像元值写入 `value_field`（长整型）。
    /// `simplify = true` 时合并垂直相邻的等宽连段。
    fn raster_to_polygons(
        &self,
        zones: &ZoneGrid,
        value_field: &str,
        simplify: bool,
    ) -> TgResult<FeatureTable>;

    /// 按字段值融合要素
    ///
    /// 同值要素的几何合并为一个 MultiPolygon，输出表只保留分组字段。
    fn dissolve(&self, table: &FeatureTable, by_field: &str) -> TgResult<FeatureTable>;

    /// 图层求交
    ///
    /// 输出要素为各图层几何的交集碎片，属性为参与要素属性的并集
    /// （同名字段取靠前图层的值）。
    fn intersect(&self, layers: &[&FeatureTable], out_name: &str) -> TgResult<FeatureTable>;

    /// 图层合并（要素拼接，字段取并集）
    fn merge(&self, layers: &[&FeatureTable], out_name: &str) -> TgResult<FeatureTable>;

    /// 空间连接（一对多，仅保留有匹配的要素）
    ///
    /// 目标要素与每个相交的连接要素各产生一行，几何取目标几何，
    /// 属性为目标属性加连接属性（同名字段保留目标的值）。
    fn spatial_join(
        &self,
        target: &FeatureTable,
        join: &FeatureTable,
        out_name: &str,
    ) -> TgResult<FeatureTable>;
}
