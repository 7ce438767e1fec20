// crates/tg_analysis/src/flood.rs

//! 淹没面积流水线
//!
//! 两段式：`process_dem_and_zones` 做一次昂贵的栅格化与裁剪，
//! 结果可在整批情景间共享；`flood_area` 在共享栅格上对单个洪水位
//! 完成 掩膜 → 矢量化 → 融合。

use crate::bridge;
use tg_foundation::naming::{datestamped_flood_name, temp_name};
use tg_foundation::units::feet_to_meters;
use tg_foundation::TgResult;
use tg_gis::{ElevationSource, GeoWorkspace, LayerSource};
use tg_raster::{flood_mask, ElevationGrid, ZoneGrid};
use tracing::info;

/// 影响区栅格中间结果名
pub const TEMP_ZONE_RASTER: &str = "_temp_pgon_as_rstr";
/// 裁剪后 DEM 中间结果名
pub const TEMP_CLIPPED_DEM: &str = "_temp_clipped2zones";
/// 淹没掩膜栅格中间结果名
pub const TEMP_FLOOD_RASTER: &str = "_temp_floods_raster";

/// 整批共享的栅格对
///
/// 两个栅格同模板，可直接送入淹没掩膜。
#[derive(Debug, Clone)]
pub struct FloodGrids {
    /// 裁剪对齐后的高程栅格
    pub elevation: ElevationGrid,
    /// 影响区栅格
    pub zones: ZoneGrid,
}

/// 准备整批情景共享的栅格
///
/// 影响区多边形按 DEM 的像元大小栅格化一次，DEM 裁剪对齐到
/// 影响区栅格的模板。中间栅格以 `_temp_` 名写入工作区，
/// 由批处理结束时的清理负责删除。
pub fn process_dem_and_zones(
    gis: &dyn GeoWorkspace,
    dem: &ElevationSource,
    zones: &LayerSource,
    id_field: &str,
) -> TgResult<FloodGrids> {
    let raw_dem = bridge::resolve_elevation(gis, dem)?;
    let zone_table = bridge::resolve_layer(gis, zones)?;

    let cell_size = raw_dem.template.cell_size;
    info!(zones = %zone_table.name, cell_size, "栅格化影响区多边形");
    let zone_grid = bridge::rasterize_zones(gis, &zone_table, id_field, cell_size)?;
    gis.store_zones(TEMP_ZONE_RASTER, zone_grid.clone())?;

    info!("裁剪 DEM 到影响区范围");
    let clipped = bridge::clip_elevation_to_zone_extent(gis, &raw_dem, &zone_grid)?;
    gis.store_elevation(TEMP_CLIPPED_DEM, clipped.clone())?;

    Ok(FloodGrids {
        elevation: clipped,
        zones: zone_grid,
    })
}

/// 计算单个洪水位的淹没范围
///
/// 洪水位以英尺给出，内部换算为米后与 DEM 比较。输出为按潮闸融合的
/// 淹没多边形数据集，返回其在工作区中的名称。`filename` 为 None 时
/// 使用带时间戳的默认名。`cleanup` 为 true 时删除本次的中间结果。
pub fn flood_area(
    gis: &dyn GeoWorkspace,
    grids: &FloodGrids,
    id_field: &str,
    elevation_feet: f64,
    filename: Option<&str>,
    cleanup: bool,
) -> TgResult<String> {
    let elevation_meters = feet_to_meters(elevation_feet);
    info!(elevation_feet, elevation_meters, "计算淹没掩膜");

    let final_name = match filename {
        Some(f) => f.to_string(),
        None => datestamped_flood_name(),
    };
    // 未提供输出名时时间戳名直接充当矢量化输出
    let vector_name = match filename {
        Some(f) => temp_name(f),
        None => final_name.clone(),
    };

    let mask = flood_mask(&grids.zones, &grids.elevation, elevation_meters)?;
    gis.store_zones(TEMP_FLOOD_RASTER, mask.clone())?;

    let polygons = bridge::mask_raster_to_polygons(gis, &mask, &vector_name, id_field)?;
    if vector_name != final_name {
        gis.store_table(polygons.clone())?;
    }

    let mut dissolved = bridge::dissolve_by_zone(gis, &polygons, id_field)?;
    dissolved.name = final_name.clone();
    gis.store_table(dissolved)?;
    info!(output = %final_name, "淹没范围已写入");

    if cleanup {
        gis.delete(TEMP_FLOOD_RASTER)?;
        if vector_name != final_name {
            gis.delete(&vector_name)?;
        }
    }

    Ok(final_name)
}
