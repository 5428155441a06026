//! # 工作池
//!
//! 有界并行执行单文件转换，失败按文件隔离。
//!
//! ## 功能
//! - 基于 rayon 的本地线程池，空闲线程从共享队列拉取任务
//! - `jobs == 1` 时退化为严格顺序执行，可观测语义不变
//! - 单文件失败转为 `Failure` 结果，池继续运行；不自动重试
//! - 转换器 panic 是唯一中止整个池的条件，以 `PoolFault` 上报
//! - 取消只阻止尚未开始的任务，已开始的任务运行至结束
//!
//! ## 依赖关系
//! - 被 `batch/coordinator.rs` 调用
//! - 使用 `batch/progress.rs` 发出事件
//! - 使用 `rayon`, `num_cpus`

use crate::batch::progress::{ProgressEvent, ProgressSender};
use crate::converter::Converter;
use crate::error::{OectError, Result};
use crate::models::{FileOutcome, FileTask};

use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 工作池
pub struct WorkerPool {
    /// 并行作业数
    jobs: usize,
}

impl WorkerPool {
    /// 创建新的工作池（0 = CPU 核心数）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行转换任务列表
    ///
    /// 每个完成的任务把 `(task, outcome)` 推入 `sink`；池发生故障时
    /// `sink` 仍保留已完成部分，供调度器计算不完整汇总。
    pub fn run<C>(
        &self,
        tasks: &[FileTask],
        converter: &C,
        cancel: &AtomicBool,
        progress: &ProgressSender,
        sink: &Mutex<Vec<(FileTask, FileOutcome)>>,
    ) -> Result<()>
    where
        C: Converter,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| OectError::PoolFault(e.to_string()))?;

        let run = catch_unwind(AssertUnwindSafe(|| {
            pool.install(|| {
                tasks.par_iter().for_each(|task| {
                    if cancel.load(Ordering::SeqCst) {
                        return;
                    }

                    progress.emit(ProgressEvent::FileStarted {
                        path: task.path().to_path_buf(),
                    });

                    let outcome = match converter.convert(task) {
                        Ok(outputs) => FileOutcome::Success { outputs },
                        Err(e) => FileOutcome::Failure {
                            message: e.to_string(),
                        },
                    };

                    progress.emit(ProgressEvent::FileCompleted {
                        path: task.path().to_path_buf(),
                        outcome: outcome.clone(),
                    });

                    sink.lock()
                        .expect("outcome sink lock poisoned")
                        .push((task.clone(), outcome));
                });
            })
        }));

        match run {
            Ok(()) => Ok(()),
            Err(payload) => Err(OectError::PoolFault(panic_message(payload.as_ref()))),
        }
    }
}

/// 提取 panic 负载中的消息
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic in converter".to_string()
    }
}
