// crates/tg_raster/src/template.rs

//! 栅格模板
//!
//! 描述栅格的空间参照：左下角原点、像元大小、行列数。
//! 数组与栅格互转时以模板保证对齐，行 0 为最上一行（与数组布局一致）。

use serde::{Deserialize, Serialize};
use tg_geo::Point2D;
use tg_foundation::{TgError, TgResult};

/// 像元大小一致性判断容差（米）
const CELL_SIZE_TOL: f64 = 1e-6;

/// 栅格模板
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTemplate {
    /// 左下角原点
    pub origin: Point2D,
    /// 像元大小（米，正方形像元）
    pub cell_size: f64,
    /// 列数
    pub width: usize,
    /// 行数
    pub height: usize,
}

impl GridTemplate {
    /// 创建新模板
    pub fn new(origin: Point2D, cell_size: f64, width: usize, height: usize) -> TgResult<Self> {
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(TgError::invalid_input(format!(
                "像元大小必须为正数: {cell_size}"
            )));
        }
        Ok(Self {
            origin,
            cell_size,
            width,
            height,
        })
    }

    /// 像元总数
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// 是否为空栅格
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 形状 (行数, 列数)
    #[inline]
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// 像元中心坐标（行 0 为最上一行）
    #[inline]
    #[must_use]
    pub fn cell_center(&self, row: usize, col: usize) -> Point2D {
        Point2D::new(
            self.origin.x + (col as f64 + 0.5) * self.cell_size,
            self.origin.y + (self.height as f64 - row as f64 - 0.5) * self.cell_size,
        )
    }

    /// 像元覆盖范围 (min_x, min_y, max_x, max_y)
    #[inline]
    #[must_use]
    pub fn cell_bounds(&self, row: usize, col: usize) -> (f64, f64, f64, f64) {
        let min_x = self.origin.x + col as f64 * self.cell_size;
        let min_y = self.origin.y + (self.height - row - 1) as f64 * self.cell_size;
        (min_x, min_y, min_x + self.cell_size, min_y + self.cell_size)
    }

    /// 坐标所在的像元 (row, col)，超出范围返回 None
    #[must_use]
    pub fn cell_at(&self, p: Point2D) -> Option<(usize, usize)> {
        let dx = p.x - self.origin.x;
        let dy = p.y - self.origin.y;
        if dx < 0.0 || dy < 0.0 {
            return None;
        }
        let col = (dx / self.cell_size).floor() as usize;
        let row_from_bottom = (dy / self.cell_size).floor() as usize;
        if col >= self.width || row_from_bottom >= self.height {
            return None;
        }
        Some((self.height - row_from_bottom - 1, col))
    }

    /// 两模板形状是否一致
    #[inline]
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// 像元大小是否一致（容差内）
    #[inline]
    #[must_use]
    pub fn same_cell_size(&self, other: &Self) -> bool {
        (self.cell_size - other.cell_size).abs() < CELL_SIZE_TOL
    }
}
