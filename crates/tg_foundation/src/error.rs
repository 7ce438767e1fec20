// crates/tg_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `TgError` 枚举和 `TgResult` 类型别名，用于整个项目的错误处理。
//!
//! # 设计原则
//!
//! 1. **集中分类**: 跨层的错误分类（字段缺失、数据未找到、许可不可用等）
//!    全部定义在基础层，上层直接复用
//! 2. **可定位**: 错误信息必须指出出错的字段名、路径或取值，
//!    操作员无需重跑即可修正输入数据
//! 3. **无重试**: 流水线中任何一步出错立即向上传播，整批中止

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type TgResult<T> = Result<T, TgError>;

/// TideGates 错误类型
#[derive(Error, Debug)]
pub enum TgError {
    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 数据集未找到
    #[error("数据集未找到: {name}")]
    DataNotFound {
        /// 未找到的数据集名称或路径
        name: String,
    },

    /// 数据集无法按请求的类型打开
    #[error("数据集加载失败: {name} 无法作为 {requested} 打开")]
    LoadFailure {
        /// 数据集名称或路径
        name: String,
        /// 请求的数据类型
        requested: &'static str,
    },

    /// 无法识别的数据类型标签
    #[error("无法识别的数据类型: {tag} (支持: raster, layer)")]
    InvalidDataType {
        /// 输入的类型标签
        tag: String,
    },

    /// 输出已存在且未允许覆盖
    #[error("输出已存在: {name} (overwrite=false)")]
    OutputExists {
        /// 冲突的输出名称
        name: String,
    },

    // ========================================================================
    // 属性表字段错误
    // ========================================================================
    /// 字段不存在
    #[error("字段不存在: {table} 中没有字段 {fields:?}")]
    FieldNotFound {
        /// 表名
        table: String,
        /// 缺失的字段名
        fields: Vec<String>,
    },

    /// 字段已存在
    #[error("字段已存在: {table} 中已有字段 {field} (overwrite=false)")]
    FieldAlreadyExists {
        /// 表名
        table: String,
        /// 冲突的字段名
        field: String,
    },

    /// 字段类型不符
    #[error("字段类型不符: {table}.{field} 期望 {expected}, 实际 {actual}")]
    FieldTypeMismatch {
        /// 表名
        table: String,
        /// 字段名
        field: String,
        /// 期望类型
        expected: &'static str,
        /// 实际类型
        actual: &'static str,
    },

    // ========================================================================
    // 栅格与情景错误
    // ========================================================================
    /// 栅格尺寸不匹配
    #[error("栅格尺寸不匹配: {name} 期望 {expected_rows}x{expected_cols}, 实际 {actual_rows}x{actual_cols}")]
    ShapeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望行数
        expected_rows: usize,
        /// 期望列数
        expected_cols: usize,
        /// 实际行数
        actual_rows: usize,
        /// 实际列数
        actual_cols: usize,
    },

    /// 未知的风暴潮类别
    #[error("未知的风暴潮类别: {category} (支持: {supported:?})")]
    UnsupportedSurgeCategory {
        /// 输入的类别名称
        category: String,
        /// 支持的类别列表
        supported: Vec<&'static str>,
    },

    /// 许可扩展不可用
    #[error("许可扩展不可用: {extension}")]
    ExtensionUnavailable {
        /// 扩展名称
        extension: String,
    },

    // ========================================================================
    // 通用错误
    // ========================================================================
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl TgError {
    /// 从 IO 错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 数据集未找到
    pub fn data_not_found(name: impl Into<String>) -> Self {
        Self::DataNotFound { name: name.into() }
    }

    /// 数据集加载失败
    pub fn load_failure(name: impl Into<String>, requested: &'static str) -> Self {
        Self::LoadFailure {
            name: name.into(),
            requested,
        }
    }

    /// 无法识别的数据类型
    pub fn invalid_data_type(tag: impl Into<String>) -> Self {
        Self::InvalidDataType { tag: tag.into() }
    }

    /// 输出已存在
    pub fn output_exists(name: impl Into<String>) -> Self {
        Self::OutputExists { name: name.into() }
    }

    /// 单个字段不存在
    pub fn field_not_found(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            table: table.into(),
            fields: vec![field.into()],
        }
    }

    /// 多个字段不存在
    pub fn fields_not_found(table: impl Into<String>, fields: Vec<String>) -> Self {
        Self::FieldNotFound {
            table: table.into(),
            fields,
        }
    }

    /// 字段已存在
    pub fn field_already_exists(table: impl Into<String>, field: impl Into<String>) -> Self {
        Self::FieldAlreadyExists {
            table: table.into(),
            field: field.into(),
        }
    }

    /// 字段类型不符
    pub fn field_type_mismatch(
        table: impl Into<String>,
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::FieldTypeMismatch {
            table: table.into(),
            field: field.into(),
            expected,
            actual,
        }
    }

    /// 栅格尺寸不匹配
    pub fn shape_mismatch(
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            name,
            expected_rows: expected.0,
            expected_cols: expected.1,
            actual_rows: actual.0,
            actual_cols: actual.1,
        }
    }

    /// 未知的风暴潮类别
    pub fn unsupported_surge(category: impl Into<String>, supported: Vec<&'static str>) -> Self {
        Self::UnsupportedSurgeCategory {
            category: category.into(),
            supported,
        }
    }

    /// 许可扩展不可用
    pub fn extension_unavailable(extension: impl Into<String>) -> Self {
        Self::ExtensionUnavailable {
            extension: extension.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl TgError {
    /// 检查两个栅格形状是否一致
    #[inline]
    pub fn check_shape(
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> TgResult<()> {
        if expected != actual {
            Err(Self::shape_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

// ========================================================================
// 标准库错误转换
// ========================================================================

impl From<std::io::Error> for TgError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 断言宏
// ========================================================================

/// 条件不满足时返回给定错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err);
        }
    };
}

/// 从 `Option` 中取值，为 `None` 时返回给定错误
#[macro_export]
macro_rules! require {
    ($opt:expr, $err:expr) => {
        match $opt {
            Some(v) => v,
            None => return Err($err),
        }
    };
}

// ========================================================================
// 测试
// ========================================================================
