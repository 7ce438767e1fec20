// crates/tg_analysis/src/bridge.rs

//! 栅格-矢量桥接
//!
//! 对工作区地理处理操作的薄封装：每个函数在调用前做前置检查，
//! 失败时立即报错并指出出错的输入，不做重试。

use tg_foundation::{TgError, TgResult};
use tg_gis::{ElevationSource, FeatureTable, GeoWorkspace, LayerSource, ZoneSource};
use tg_raster::{ElevationGrid, ZoneGrid};

/// 矢量化输出的默认分组字段名
pub const GRIDCODE: &str = "gridcode";

/// 把高程来源解析为具体栅格
pub fn resolve_elevation(gis: &dyn GeoWorkspace, src: &ElevationSource) -> TgResult<ElevationGrid> {
    match src {
        ElevationSource::Name(name) => gis.fetch_elevation(name),
        ElevationSource::Grid(grid) => Ok(grid.clone()),
    }
}

/// 把影响区来源解析为具体栅格
pub fn resolve_zones(gis: &dyn GeoWorkspace, src: &ZoneSource) -> TgResult<ZoneGrid> {
    match src {
        ZoneSource::Name(name) => gis.fetch_zones(name),
        ZoneSource::Grid(grid) => Ok(grid.clone()),
    }
}

/// 把矢量来源解析为具体要素表
pub fn resolve_layer(gis: &dyn GeoWorkspace, src: &LayerSource) -> TgResult<FeatureTable> {
    match src {
        LayerSource::Name(name) => gis.fetch_table(name),
        LayerSource::Table(table) => Ok(table.clone()),
    }
}

/// 影响区多边形栅格化
///
/// `id_field` 不存在时立即报 [`TgError::FieldNotFound`]，
/// 不进入栅格化主循环。
pub fn rasterize_zones(
    gis: &dyn GeoWorkspace,
    zones: &FeatureTable,
    id_field: &str,
    cell_size: f64,
) -> TgResult<ZoneGrid> {
    zones.check_fields(true, &[id_field])?;
    gis.polygons_to_raster(zones, id_field, cell_size)
}

/// 把 DEM 裁剪到影响区栅格的范围
///
/// 输出与影响区栅格同模板，像元对齐，不改变像元大小。
pub fn clip_elevation_to_zone_extent(
    gis: &dyn GeoWorkspace,
    dem: &ElevationGrid,
    zones: &ZoneGrid,
) -> TgResult<ElevationGrid> {
    if !dem.template.same_cell_size(&zones.template) {
        return Err(TgError::invalid_input(format!(
            "DEM 与影响区栅格的像元大小不一致: {} vs {}",
            dem.template.cell_size, zones.template.cell_size
        )));
    }
    gis.clip_raster(dem, &zones.template)
}

/// 淹没掩膜矢量化
///
/// 矢量化输出自带 `gridcode` 分组字段，改名为调用方的潮闸编号字段。
pub fn mask_raster_to_polygons(
    gis: &dyn GeoWorkspace,
    mask: &ZoneGrid,
    name: &str,
    zone_id_field: &str,
) -> TgResult<FeatureTable> {
    let mut table = gis.raster_to_polygons(mask, GRIDCODE, true)?;
    table.name = name.to_string();
    if zone_id_field != GRIDCODE {
        table.rename_field(GRIDCODE, zone_id_field)?;
    }
    Ok(table)
}

/// 按潮闸编号融合碎片
///
/// 一个潮闸的淹没区常被栅格化拆成多个碎片，融合后每个潮闸恰好一个要素。
pub fn dissolve_by_zone(
    gis: &dyn GeoWorkspace,
    polygons: &FeatureTable,
    zone_id_field: &str,
) -> TgResult<FeatureTable> {
    polygons.check_fields(true, &[zone_id_field])?;
    gis.dissolve(polygons, zone_id_field)
}
