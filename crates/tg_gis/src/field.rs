// crates/tg_gis/src/field.rs

//! 属性字段类型与值
//!
//! 要素表支持三种字段类型：长整型、双精度、文本。
//! [`FieldValue`] 提供全序比较（浮点按 total order），可作为分组键。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 字段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 长整型
    Long,
    /// 双精度浮点
    Double,
    /// 文本
    Text,
}

impl FieldType {
    /// 类型名称
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Double => "DOUBLE",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 字段值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    /// 长整型值
    Long(i64),
    /// 双精度值
    Double(f64),
    /// 文本值
    Text(String),
}

impl FieldValue {
    /// 值对应的字段类型
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Long(_) => FieldType::Long,
            Self::Double(_) => FieldType::Double,
            Self::Text(_) => FieldType::Text,
        }
    }

    /// 按数值解释（文本返回 None）
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Long(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// 按长整型解释
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            Self::Double(v) => Some(*v as i64),
            Self::Text(_) => None,
        }
    }

    /// 按文本解释
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 变体排序权重，用于跨类型比较
    fn tag(&self) -> u8 {
        match self {
            Self::Long(_) => 0,
            Self::Double(_) => 1,
            Self::Text(_) => 2,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.tag().cmp(&other.tag()),
        }
    }
}

impl std::hash::Hash for FieldValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Self::Long(v) => v.hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Long(i64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}
