// crates/tg_geo/src/geometry.rs

//! 几何类型定义
//!
//! 提供项目统一的平面几何类型。所有坐标均为投影坐标（米），
//! 不处理经纬度和坐标系转换。
//!
//! # 类型
//!
//! - [`Point2D`]: 2D 点 / 向量
//! - [`Polygon`]: 单环多边形（隐式闭合，不含洞）
//! - [`MultiPolygon`]: 多边形集合，潮闸淹没区常由多个不相连的碎片组成

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 面积视为零的阈值（平方米）
const AREA_EPS: f64 = 1e-9;

// ============================================================================
// Point2D
// ============================================================================

/// 2D 点 - 项目统一几何类型
///
/// # 示例
///
/// ```
/// use tg_geo::geometry::Point2D;
///
/// let p1 = Point2D::new(0.0, 0.0);
/// let p2 = Point2D::new(3.0, 4.0);
/// assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-10);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X坐标
    pub x: f64,
    /// Y坐标
    pub y: f64,
}

impl Point2D {
    /// 零点常量
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的2D点
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 叉积（返回标量，即Z分量）
    #[inline]
    #[must_use]
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// 向量长度
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 计算到另一个点的欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 判断是否为有限数（非NaN、非Inf）
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Point2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// 单环多边形
///
/// 顶点序列隐式闭合（末点不重复首点），不支持洞。
/// 潮闸分析中的几何均来自栅格化/矢量化，满足此约束。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// 外环顶点
    pub ring: Vec<Point2D>,
}

impl Polygon {
    /// 从顶点序列创建
    #[must_use]
    pub fn new(ring: Vec<Point2D>) -> Self {
        Self { ring }
    }

    /// 轴对齐矩形
    #[must_use]
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            ring: vec![
                Point2D::new(min_x, min_y),
                Point2D::new(max_x, min_y),
                Point2D::new(max_x, max_y),
                Point2D::new(min_x, max_y),
            ],
        }
    }

    /// 有向面积（鞋带公式，逆时针为正）
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if self.ring.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..self.ring.len() {
            let a = self.ring[i];
            let b = self.ring[(i + 1) % self.ring.len()];
            sum += a.cross(&b);
        }
        sum / 2.0
    }

    /// 面积（非负）
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// 是否退化（顶点不足或面积为零）
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.ring.len() < 3 || self.area() < AREA_EPS
    }

    /// 包围盒 (min_x, min_y, max_x, max_y)
    ///
    /// 空环返回 None。
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.ring.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &self.ring[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some((min_x, min_y, max_x, max_y))
    }

    /// 点是否在多边形内（射线法，边界算内）
    #[must_use]
    pub fn contains_point(&self, p: &Point2D) -> bool {
        let n = self.ring.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.ring[i];
            let b = self.ring[j];
            // 边界上的点
            let edge = b - a;
            let to_p = *p - a;
            if edge.cross(&to_p).abs() < 1e-12
                && to_p.dot(&edge) >= 0.0
                && to_p.length() <= edge.length()
            {
                return true;
            }
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// 是否为凸多边形
    ///
    /// 所有相邻边叉积同号（允许共线）即为凸。
    #[must_use]
    pub fn is_convex(&self) -> bool {
        let n = self.ring.len();
        if n < 3 {
            return false;
        }
        let mut sign = 0.0_f64;
        for i in 0..n {
            let a = self.ring[i];
            let b = self.ring[(i + 1) % n];
            let c = self.ring[(i + 2) % n];
            let cross = (b - a).cross(&(c - b));
            if cross.abs() < 1e-12 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    /// 两多边形是否相交（含边界接触）
    ///
    /// 顶点互含或任意一对边相交即视为相交。
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        match (self.bounds(), other.bounds()) {
            (Some(a), Some(b)) => {
                if a.2 < b.0 || b.2 < a.0 || a.3 < b.1 || b.3 < a.1 {
                    return false;
                }
            }
            _ => return false,
        }
        if other.ring.iter().any(|p| self.contains_point(p))
            || self.ring.iter().any(|p| other.contains_point(p))
        {
            return true;
        }
        let n = self.ring.len();
        let m = other.ring.len();
        for i in 0..n {
            let a0 = self.ring[i];
            let a1 = self.ring[(i + 1) % n];
            for j in 0..m {
                let b0 = other.ring[j];
                let b1 = other.ring[(j + 1) % m];
                if segments_intersect(a0, a1, b0, b1) {
                    return true;
                }
            }
        }
        false
    }

    /// 保证逆时针方向，返回新多边形
    #[must_use]
    pub fn oriented_ccw(&self) -> Self {
        if self.signed_area() < 0.0 {
            let mut ring = self.ring.clone();
            ring.reverse();
            Self { ring }
        } else {
            self.clone()
        }
    }
}

/// 线段相交判定（含端点接触与共线重叠）
fn segments_intersect(a0: Point2D, a1: Point2D, b0: Point2D, b1: Point2D) -> bool {
    let d1 = (a1 - a0).cross(&(b0 - a0));
    let d2 = (a1 - a0).cross(&(b1 - a0));
    let d3 = (b1 - b0).cross(&(a0 - b0));
    let d4 = (b1 - b0).cross(&(a1 - b0));

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    let on_segment = |p: Point2D, q: Point2D, r: Point2D| {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-12 && on_segment(a0, a1, b0))
        || (d2.abs() < 1e-12 && on_segment(a0, a1, b1))
        || (d3.abs() < 1e-12 && on_segment(b0, b1, a0))
        || (d4.abs() < 1e-12 && on_segment(b0, b1, a1))
}

// ============================================================================
// MultiPolygon
// ============================================================================

/// 多边形集合
///
/// 一个潮闸的淹没区可能由多个互不相连的碎片组成；
/// 按潮闸 dissolve 后每个要素持有一个 MultiPolygon。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    /// 组成部分
    pub parts: Vec<Polygon>,
}

impl MultiPolygon {
    /// 空集合
    #[must_use]
    pub fn empty() -> Self {
        Self { parts: Vec::new() }
    }

    /// 从单个多边形创建
    #[must_use]
    pub fn from_polygon(polygon: Polygon) -> Self {
        Self {
            parts: vec![polygon],
        }
    }

    /// 从多个多边形创建
    #[must_use]
    pub fn from_parts(parts: Vec<Polygon>) -> Self {
        Self { parts }
    }

    /// 追加一个组成部分
    pub fn push(&mut self, polygon: Polygon) {
        self.parts.push(polygon);
    }

    /// 合并另一个集合的所有部分
    pub fn extend(&mut self, other: MultiPolygon) {
        self.parts.extend(other.parts);
    }

    /// 总面积
    #[must_use]
    pub fn area(&self) -> f64 {
        self.parts.iter().map(Polygon::area).sum()
    }

    /// 是否为空（无有效面积）
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(Polygon::is_degenerate)
    }

    /// 整体包围盒
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut merged: Option<(f64, f64, f64, f64)> = None;
        for part in &self.parts {
            if let Some((x0, y0, x1, y1)) = part.bounds() {
                merged = Some(match merged {
                    None => (x0, y0, x1, y1),
                    Some((mx0, my0, mx1, my1)) => {
                        (mx0.min(x0), my0.min(y0), mx1.max(x1), my1.max(y1))
                    }
                });
            }
        }
        merged
    }

    /// 点是否落在任一组成部分内
    #[must_use]
    pub fn contains_point(&self, p: &Point2D) -> bool {
        self.parts.iter().any(|part| part.contains_point(p))
    }

    /// 两集合是否相交（任意一对组成部分相交）
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.parts
            .iter()
            .any(|a| other.parts.iter().any(|b| a.intersects(b)))
    }
}

// ============================================================================
// 测试
// ============================================================================
