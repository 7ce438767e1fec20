// crates/tg_geo/src/spatial_index.rs

//! 空间索引实现
//!
//! 基于 R-tree 的包围盒索引，用于图层求交 / 空间连接时的候选筛选。
//!
//! # 示例
//!
//! ```
//! use tg_geo::spatial_index::{BoundingBox, SpatialIndex};
//!
//! let mut index: SpatialIndex<usize> = SpatialIndex::new();
//! index.insert(BoundingBox::new(0.0, 0.0, 10.0, 10.0), 0);
//! index.insert(BoundingBox::new(20.0, 20.0, 30.0, 30.0), 1);
//!
//! let hits = index.query(&BoundingBox::new(5.0, 5.0, 15.0, 15.0));
//! assert_eq!(hits, vec![&0]);
//! ```

use crate::geometry::Point2D;
use rstar::{RTree, RTreeObject, AABB};

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框（自动纠正角点顺序）
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 从 (min_x, min_y, max_x, max_y) 元组创建
    #[must_use]
    pub fn from_tuple(bounds: (f64, f64, f64, f64)) -> Self {
        Self::new(bounds.0, bounds.1, bounds.2, bounds.3)
    }

    /// 检查点是否在边界框内
    #[must_use]
    pub fn contains_point(&self, point: &Point2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// 检查两个边界框是否相交
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// 合并两个边界框
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// 宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// 高度
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// 索引条目：包围盒 + 载荷
#[derive(Debug, Clone)]
struct Entry<T> {
    bbox: BoundingBox,
    value: T,
}

impl<T> RTreeObject for Entry<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min_x, self.bbox.min_y],
            [self.bbox.max_x, self.bbox.max_y],
        )
    }
}

/// 包围盒空间索引
#[derive(Debug, Default)]
pub struct SpatialIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T> SpatialIndex<T> {
    /// 创建空索引
    #[must_use]
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// 插入条目
    pub fn insert(&mut self, bbox: BoundingBox, value: T) {
        self.tree.insert(Entry { bbox, value });
    }

    /// 查询与给定包围盒相交的所有载荷
    #[must_use]
    pub fn query(&self, bbox: &BoundingBox) -> Vec<&T> {
        let envelope = AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| &e.value)
            .collect()
    }

    /// 条目数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_index_query() {
        let mut index: SpatialIndex<u32> = SpatialIndex::new();
        index.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 1);
        index.insert(BoundingBox::new(2.0, 2.0, 3.0, 3.0), 2);
        index.insert(BoundingBox::new(0.5, 0.5, 2.5, 2.5), 3);

        let mut hits = index.query(&BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        hits.sort();
        assert_eq!(hits, vec![&1, &3]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_touching_boxes_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(1.0, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
    }
}
