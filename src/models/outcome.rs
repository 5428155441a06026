//! # 转换结果与批处理汇总
//!
//! 单文件结果（FileOutcome）与顺序无关的聚合汇总（BatchSummary）。
//!
//! ## 功能
//! - 每个任务恰好一个结果，成功或失败
//! - 汇总聚合可交换：计数不依赖到达顺序
//! - 失败列表按路径排序，便于诊断输出
//!
//! ## 依赖关系
//! - 被 `batch/`, `commands/` 使用
//! - 使用 `tabled` 渲染失败列表

use crate::models::FileTask;

use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// 单个文件的转换结果
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// 转换成功，按生成顺序列出输出文件
    Success { outputs: Vec<PathBuf> },
    /// 转换失败，保留区分失败种类的消息
    Failure { message: String },
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Success { .. })
    }
}

/// 失败记录（用户可见诊断）
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct FailureRecord {
    #[tabled(rename = "File")]
    pub path: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
}

/// 批处理汇总
///
/// 批处理结束时一次性计算，只读；从不部分发布。
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// 发现的文件总数
    pub total: usize,
    /// 成功数量
    pub successful: usize,
    /// 失败数量
    pub failed: usize,
    /// 生成的 CSV 文件总数
    pub total_outputs: usize,
    /// 失败详情，按路径排序
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    /// 从收集到的结果聚合
    ///
    /// 结果到达顺序不影响计数；取消或池故障导致的缺口体现为
    /// `successful + failed < total`。
    pub fn from_outcomes(total: usize, outcomes: &[(FileTask, FileOutcome)]) -> Self {
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (task, outcome) in outcomes {
            match outcome {
                FileOutcome::Success { outputs } => {
                    summary.successful += 1;
                    summary.total_outputs += outputs.len();
                }
                FileOutcome::Failure { message } => {
                    summary.failed += 1;
                    summary.failures.push(FailureRecord {
                        path: task.path().display().to_string(),
                        reason: message.clone(),
                    });
                }
            }
        }

        summary.failures.sort_by(|a, b| a.path.cmp(&b.path));
        summary
    }

    /// 每个发现的文件是否都有结果
    pub fn is_complete(&self) -> bool {
        self.successful + self.failed == self.total
    }
}
