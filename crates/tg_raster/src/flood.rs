// crates/tg_raster/src/flood.rs

//! 淹没掩膜
//!
//! 核心判定：潮闸影响区内、高程不高于洪水位的像元视为被淹没，
//! 保留其潮闸编号；其余像元置 0。

use crate::grid::{ElevationGrid, ZoneGrid};
use tg_foundation::{TgError, TgResult};

/// 计算淹没掩膜
///
/// 对每个像元：
/// - 潮闸编号 <= 0（非影响区）则输出 0；
/// - 高程为无效值（NODATA 或 NaN）则输出 0；
/// - 高程 > 洪水位（严格）则输出 0；
/// - 否则保留潮闸编号。
///
/// 两栅格形状不一致时返回 [`TgError::ShapeMismatch`]。
/// 输入栅格不会被修改。
pub fn flood_mask(
    zones: &ZoneGrid,
    elevation: &ElevationGrid,
    flood_level_m: f64,
) -> TgResult<ZoneGrid> {
    if !zones.template.same_shape(&elevation.template) {
        return Err(TgError::shape_mismatch(
            "flood mask",
            zones.shape(),
            elevation.shape(),
        ));
    }

    // 在副本上工作，保证调用方数组不被改动
    let mut out = ZoneGrid::zeros(zones.template);
    for (i, (&zone, &elev)) in zones.data.iter().zip(elevation.data.iter()).enumerate() {
        if zone <= 0 || elevation.is_nodata(elev) || elev > flood_level_m {
            continue;
        }
        out.data[i] = zone;
    }
    Ok(out)
}
