//! # 数据模型模块
//!
//! 定义批处理作业的核心数据结构。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter/`, `commands/` 使用
//! - 子模块: job, outcome

pub mod job;
pub mod outcome;

pub use job::{ContentCategory, FileTask, JobSpec};
pub use outcome::{BatchSummary, FailureRecord, FileOutcome};
