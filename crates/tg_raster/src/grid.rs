// crates/tg_raster/src/grid.rs

//! 栅格数据管理
//!
//! 提供高程栅格（连续值）和潮闸影响区栅格（分类值）的存储和访问。
//! 无效值统一用 NODATA 哨兵 (-999) 表示。

use crate::template::GridTemplate;
use serde::{Deserialize, Serialize};
use tg_foundation::{TgError, TgResult};

/// 无效值哨兵
pub const NODATA: f64 = -999.0;

// ============================================================================
// ElevationGrid - 高程栅格
// ============================================================================

/// 高程栅格（DEM 的数组表示，单位米）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationGrid {
    /// 空间模板
    pub template: GridTemplate,
    /// 行优先存储的高程值
    pub data: Vec<f64>,
    /// 无效值哨兵
    pub nodata: f64,
}

impl ElevationGrid {
    /// 创建填满 NODATA 的栅格
    #[must_use]
    pub fn filled(template: GridTemplate) -> Self {
        Self {
            data: vec![NODATA; template.len()],
            template,
            nodata: NODATA,
        }
    }

    /// 从数据创建，长度必须与模板一致
    pub fn from_data(template: GridTemplate, data: Vec<f64>) -> TgResult<Self> {
        if data.len() != template.len() {
            return Err(TgError::shape_mismatch(
                "elevation grid",
                template.shape(),
                (data.len() / template.width.max(1), template.width),
            ));
        }
        Ok(Self {
            template,
            data,
            nodata: NODATA,
        })
    }

    /// 获取像元值
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.template.height && col < self.template.width {
            Some(self.data[row * self.template.width + col])
        } else {
            None
        }
    }

    /// 设置像元值
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.template.height && col < self.template.width {
            self.data[row * self.template.width + col] = value;
        }
    }

    /// 判断某值是否为无效值
    #[inline]
    #[must_use]
    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || (value - self.nodata).abs() < 1e-10
    }

    /// 形状 (行数, 列数)
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.template.shape()
    }
}

// ============================================================================
// ZoneGrid - 影响区栅格
// ============================================================================

/// 潮闸影响区栅格
///
/// 像元值为潮闸编号（正整数）；0 或负值表示不属于任何影响区。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneGrid {
    /// 空间模板
    pub template: GridTemplate,
    /// 行优先存储的潮闸编号
    pub data: Vec<i32>,
}

impl ZoneGrid {
    /// 创建全零（无影响区）栅格
    #[must_use]
    pub fn zeros(template: GridTemplate) -> Self {
        Self {
            data: vec![0; template.len()],
            template,
        }
    }

    /// 从数据创建，长度必须与模板一致
    pub fn from_data(template: GridTemplate, data: Vec<i32>) -> TgResult<Self> {
        if data.len() != template.len() {
            return Err(TgError::shape_mismatch(
                "zone grid",
                template.shape(),
                (data.len() / template.width.max(1), template.width),
            ));
        }
        Ok(Self { template, data })
    }

    /// 获取像元值
    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row < self.template.height && col < self.template.width {
            Some(self.data[row * self.template.width + col])
        } else {
            None
        }
    }

    /// 设置像元值
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: i32) {
        if row < self.template.height && col < self.template.width {
            self.data[row * self.template.width + col] = value;
        }
    }

    /// 形状 (行数, 列数)
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.template.shape()
    }

    /// 出现过的潮闸编号（升序，不含 0 及负值）
    #[must_use]
    pub fn zone_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.data.iter().copied().filter(|&v| v > 0).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tg_geo::Point2D;

    fn template(width: usize, height: usize) -> GridTemplate {
        GridTemplate::new(Point2D::ZERO, 1.0, width, height).unwrap()
    }

    #[test]
    fn test_from_data_checks_len() {
        assert!(ElevationGrid::from_data(template(2, 2), vec![1.0; 4]).is_ok());
        assert!(ElevationGrid::from_data(template(2, 2), vec![1.0; 3]).is_err());
        assert!(ZoneGrid::from_data(template(3, 1), vec![1, 2]).is_err());
    }

    #[test]
    fn test_is_nodata() {
        let g = ElevationGrid::filled(template(1, 1));
        assert!(g.is_nodata(NODATA));
        assert!(g.is_nodata(f64::NAN));
        assert!(!g.is_nodata(0.0));
    }

    #[test]
    fn test_get_set() {
        let mut g = ZoneGrid::zeros(template(2, 2));
        g.set(1, 0, 7);
        assert_eq!(g.get(1, 0), Some(7));
        assert_eq!(g.get(2, 0), None);
    }

    #[test]
    fn test_zone_ids() {
        let g = ZoneGrid::from_data(template(3, 2), vec![0, 2, 2, 1, 0, -5]).unwrap();
        assert_eq!(g.zone_ids(), vec![1, 2]);
    }
}
