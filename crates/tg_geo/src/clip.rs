// crates/tg_geo/src/clip.rs

//! 凸多边形裁剪
//!
//! Sutherland–Hodgman 算法：以凸多边形为裁剪窗口，裁剪任意简单多边形。
//! 栅格矢量化产生的淹没区碎片全部是轴对齐矩形（凸），
//! 因此洪水层与资产层求交时总能满足"至少一个操作数为凸"的前提。

use crate::geometry::{MultiPolygon, Point2D, Polygon};
use tg_foundation::{TgError, TgResult};

/// 用凸多边形裁剪任意简单多边形
///
/// `clip` 必须是凸多边形；返回裁剪结果，无重叠时返回 None。
#[must_use]
pub fn clip_by_convex(subject: &Polygon, clip: &Polygon) -> Option<Polygon> {
    let clip = clip.oriented_ccw();
    let n = clip.ring.len();
    if n < 3 || subject.ring.len() < 3 {
        return None;
    }

    let mut output = subject.ring.clone();
    for i in 0..n {
        let a = clip.ring[i];
        let b = clip.ring[(i + 1) % n];
        let input = std::mem::take(&mut output);
        if input.is_empty() {
            return None;
        }

        for j in 0..input.len() {
            let cur = input[j];
            let prev = input[(j + input.len() - 1) % input.len()];
            let cur_inside = is_left_or_on(&a, &b, &cur);
            let prev_inside = is_left_or_on(&a, &b, &prev);

            if cur_inside {
                if !prev_inside {
                    if let Some(p) = line_intersection(&prev, &cur, &a, &b) {
                        output.push(p);
                    }
                }
                output.push(cur);
            } else if prev_inside {
                if let Some(p) = line_intersection(&prev, &cur, &a, &b) {
                    output.push(p);
                }
            }
        }
    }

    let result = Polygon::new(output);
    if result.is_degenerate() {
        None
    } else {
        Some(result)
    }
}

/// 点在有向边左侧或边上
#[inline]
fn is_left_or_on(a: &Point2D, b: &Point2D, p: &Point2D) -> bool {
    (*b - *a).cross(&(*p - *a)) >= -1e-12
}

/// 两直线交点（线段所在直线，不检查参数范围）
///
/// Sutherland–Hodgman 只在跨越裁剪边时调用，交点必然落在线段内。
fn line_intersection(p1: &Point2D, p2: &Point2D, a: &Point2D, b: &Point2D) -> Option<Point2D> {
    let r = *p2 - *p1;
    let s = *b - *a;
    let denom = r.cross(&s);
    if denom.abs() < 1e-15 {
        return None;
    }
    let t = (*a - *p1).cross(&s) / denom;
    Some(*p1 + r * t)
}

/// 两个 MultiPolygon 求交
///
/// 对每对组成部分，要求至少一方为凸；以凸的一方为裁剪窗口。
/// 两方都不凸时报错（内存工作区的已知限制）。
pub fn intersection(a: &MultiPolygon, b: &MultiPolygon) -> TgResult<MultiPolygon> {
    let mut fragments = MultiPolygon::empty();
    for pa in &a.parts {
        if pa.is_degenerate() {
            continue;
        }
        for pb in &b.parts {
            if pb.is_degenerate() {
                continue;
            }
            // 包围盒不相交的组合直接跳过
            if let (Some(ba), Some(bb)) = (pa.bounds(), pb.bounds()) {
                if ba.2 < bb.0 || bb.2 < ba.0 || ba.3 < bb.1 || bb.3 < ba.1 {
                    continue;
                }
            }
            let clipped = if pa.is_convex() {
                clip_by_convex(pb, pa)
            } else if pb.is_convex() {
                clip_by_convex(pa, pb)
            } else {
                return Err(TgError::invalid_input(
                    "多边形求交要求至少一个操作数为凸多边形",
                ));
            };
            if let Some(piece) = clipped {
                fragments.push(piece);
            }
        }
    }
    Ok(fragments)
}
