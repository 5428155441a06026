//! # 转换器接口
//!
//! 单文件转换契约：批处理核心只通过该接口触碰工作簿内容。
//!
//! ## 依赖关系
//! - 被 `batch/pool.rs`, `batch/coordinator.rs` 使用
//! - 子模块: excel

pub mod excel;

pub use excel::ExcelConverter;

use crate::error::Result;
use crate::models::FileTask;

use std::path::PathBuf;

/// 单文件转换契约
///
/// 成功时按生成顺序返回输出文件路径；失败返回单文件级错误
/// （`UnsupportedFormat` / `CorruptFile` / `NoMatchingSheet` / I/O）。
/// 实现必须无状态且可跨线程共享。
pub trait Converter: Send + Sync {
    fn convert(&self, task: &FileTask) -> Result<Vec<PathBuf>>;
}

impl<F> Converter for F
where
    F: Fn(&FileTask) -> Result<Vec<PathBuf>> + Send + Sync,
{
    fn convert(&self, task: &FileTask) -> Result<Vec<PathBuf>> {
        self(task)
    }
}
