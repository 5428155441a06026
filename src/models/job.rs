//! # 作业描述
//!
//! 一次批处理调用的不可变配置（JobSpec）与单文件任务（FileTask）。
//!
//! ## 功能
//! - 工作表内容类别定义（transfer / transient）
//! - 作业参数校验（开始任何工作前快速失败）
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter/`, `cli.rs` 使用

use crate::error::{OectError, Result};

use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 工作表内容类别
///
/// OECT 测试工作簿中按名称识别的工作表子集。
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Transfer curve sheets (Id-Vg)
    Transfer,
    /// Transient response sheets (Id-t)
    Transient,
}

impl ContentCategory {
    /// 工作表名称匹配关键字（不区分大小写包含匹配）
    pub fn keyword(&self) -> &'static str {
        match self {
            ContentCategory::Transfer => "transfer",
            ContentCategory::Transient => "transient",
        }
    }

    /// 工作表名称是否属于该类别
    pub fn matches(&self, sheet_name: &str) -> bool {
        sheet_name.to_lowercase().contains(self.keyword())
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// 一次批处理调用的完整配置
///
/// 创建后不再修改，通过 `Arc` 只读共享给所有工作线程。
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// 输入路径（单文件模式为文件，批量模式为目录）
    pub input: PathBuf,
    /// 批量目录模式
    pub batch: bool,
    /// 文件名 glob 模式（批量模式）
    pub pattern: String,
    /// 启用的内容类别（至少一个）
    pub categories: Vec<ContentCategory>,
    /// 输出文件名前缀
    pub output_prefix: String,
    /// 输出目录（None = 输入文件所在目录）
    pub output_dir: Option<PathBuf>,
    /// 最大并行度（0 = CPU 核心数）
    pub jobs: usize,
}

impl JobSpec {
    /// 开始前的同步校验
    ///
    /// 类别为空或输入路径缺失时快速失败，不触发扫描、不发出事件。
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(OectError::InvalidArgument(
                "at least one sheet category must be enabled".to_string(),
            ));
        }
        if self.batch {
            if !self.input.is_dir() {
                return Err(OectError::DirectoryNotFound {
                    path: self.input.display().to_string(),
                });
            }
        } else if !self.input.is_file() {
            return Err(OectError::FileNotFound {
                path: self.input.display().to_string(),
            });
        }
        Ok(())
    }

    /// 类别列表的显示形式，如 "transfer, transient"
    pub fn category_list(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 单个待转换文件任务
///
/// 由扫描器创建，恰好被一个工作线程消费。
#[derive(Debug, Clone)]
pub struct FileTask {
    path: PathBuf,
    spec: Arc<JobSpec>,
}

impl FileTask {
    pub fn new(path: PathBuf, spec: Arc<JobSpec>) -> Self {
        Self { path, spec }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// 输出目录：JobSpec 指定的目录，否则输入文件所在目录
    pub fn output_dir(&self) -> PathBuf {
        match &self.spec.output_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
