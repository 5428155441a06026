//! # 统一错误处理模块
//!
//! 定义 oect2csv 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - 校验/扫描错误：批处理开始前同步拒绝
//! - 单文件错误：隔离在工作池内，记录进汇总
//! - 池故障：致命，中止剩余任务
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// oect2csv 统一错误类型
#[derive(Error, Debug)]
pub enum OectError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 单文件转换错误（非致命，记录进汇总）
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt or unreadable workbook: {path}\nReason: {reason}")]
    CorruptFile { path: String, reason: String },

    #[error("No worksheet matched categories [{categories}] in {path}")]
    NoMatchingSheet { path: String, categories: String },

    // ─────────────────────────────────────────────────────────────
    // 批处理错误
    // ─────────────────────────────────────────────────────────────
    #[error("A batch is already in progress on this coordinator")]
    AlreadyRunning,

    #[error("Worker pool fault: {0}")]
    PoolFault(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, OectError>;
