//! # 文件扫描器
//!
//! 根据作业配置发现待转换文件列表。
//!
//! ## 功能
//! - 单文件模式：恰好产出给定路径
//! - 批量模式：仅遍历目录顶层（测量文件目录约定，不递归）
//! - glob 模式过滤，按文件名字典序排序，重复扫描结果一致
//!
//! ## 依赖关系
//! - 被 `batch/coordinator.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{OectError, Result};
use crate::models::JobSpec;

use std::path::PathBuf;
use walkdir::WalkDir;

/// 文件扫描器
pub struct PathScanner<'a> {
    spec: &'a JobSpec,
}

impl<'a> PathScanner<'a> {
    pub fn new(spec: &'a JobSpec) -> Self {
        Self { spec }
    }

    /// 收集所有待转换文件
    ///
    /// 无匹配文件时返回空列表而非错误，由调用方决定如何报告。
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.spec.batch {
            return self.scan_single();
        }
        self.scan_directory()
    }

    fn scan_single(&self) -> Result<Vec<PathBuf>> {
        if !self.spec.input.is_file() {
            return Err(OectError::FileNotFound {
                path: self.spec.input.display().to_string(),
            });
        }
        Ok(vec![self.spec.input.clone()])
    }

    fn scan_directory(&self) -> Result<Vec<PathBuf>> {
        if !self.spec.input.is_dir() {
            return Err(OectError::DirectoryNotFound {
                path: self.spec.input.display().to_string(),
            });
        }

        let pattern = glob::Pattern::new(&self.spec.pattern).map_err(|e| {
            OectError::InvalidArgument(format!("Invalid pattern '{}': {}", self.spec.pattern, e))
        })?;

        let mut files: Vec<PathBuf> = WalkDir::new(&self.spec.input)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| pattern.matches(name))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }
}
