//! # 批处理调度器
//!
//! 串联扫描器 → 工作池 → 进度通道，收集结果并产出最终汇总。
//!
//! ## 状态机
//! `Idle → Scanning → Running → Finalizing → Done`，
//! 终态 `Failed` 仅在扫描故障或池故障时进入。
//!
//! ## 功能
//! - `start` 同步校验后立即返回，批处理在独立 OS 线程上运行
//! - 同一调度器同时只允许一个批处理；`Done` 后不可复用
//! - 取消为建议性：跳过未开始任务，已开始任务运行至结束
//! - `BatchFinished` 恰好发出一次，即使取消或池故障
//!
//! ## 依赖关系
//! - 被 `commands/process.rs` 使用
//! - 使用 `batch/scanner.rs`, `batch/pool.rs`, `batch/progress.rs`

use crate::batch::pool::WorkerPool;
use crate::batch::progress::{self, ProgressEvent, ProgressReceiver, ProgressSender};
use crate::batch::scanner::PathScanner;
use crate::converter::Converter;
use crate::error::{OectError, Result};
use crate::models::{BatchSummary, FileOutcome, FileTask, JobSpec};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Scanning,
    Running,
    Finalizing,
    Done,
    Failed,
}

/// 批处理调度器
pub struct BatchCoordinator {
    state: Arc<Mutex<BatchState>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<BatchSummary>>>,
}

impl BatchCoordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BatchState::Idle)),
            cancel: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// 当前状态
    pub fn state(&self) -> BatchState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// 启动批处理
    ///
    /// 同步校验失败（类别为空、路径缺失）直接返回错误，状态保持
    /// `Idle`，不扫描、不发事件。成功时立即返回事件接收端，实际
    /// 工作在后台线程进行。
    pub fn start<C>(&mut self, spec: JobSpec, converter: C) -> Result<ProgressReceiver>
    where
        C: Converter + 'static,
    {
        {
            let state = self.state.lock().expect("state lock poisoned");
            if *state != BatchState::Idle {
                return Err(OectError::AlreadyRunning);
            }
        }

        spec.validate()?;

        let (tx, rx) = progress::channel();
        let state = self.state.clone();
        let cancel = self.cancel.clone();
        set_state(&state, BatchState::Scanning);

        self.handle = Some(std::thread::spawn(move || {
            run_batch(Arc::new(spec), converter, state, cancel, tx)
        }));

        Ok(rx)
    }

    /// 请求取消：不中断已开始的转换，只阻止后续任务的分发
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// 等待批处理结束并取回汇总
    ///
    /// 池故障时返回 `PoolFault`；不完整汇总已通过 `BatchFinished`
    /// 事件送达观察者。
    pub fn wait(&mut self) -> Result<BatchSummary> {
        let handle = self.handle.take().ok_or_else(|| {
            OectError::InvalidArgument("no batch has been started".to_string())
        })?;
        handle
            .join()
            .map_err(|_| OectError::PoolFault("batch thread panicked".to_string()))?
    }
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn set_state(state: &Mutex<BatchState>, next: BatchState) {
    *state.lock().expect("state lock poisoned") = next;
}

/// 后台线程主体
fn run_batch<C>(
    spec: Arc<JobSpec>,
    converter: C,
    state: Arc<Mutex<BatchState>>,
    cancel: Arc<AtomicBool>,
    tx: ProgressSender,
) -> Result<BatchSummary>
where
    C: Converter,
{
    let files = match PathScanner::new(&spec).scan() {
        Ok(files) => files,
        Err(e) => {
            // 扫描故障：观察者仍收到结束事件，汇总为空且不完整标记无意义
            set_state(&state, BatchState::Failed);
            tx.emit(ProgressEvent::BatchFinished {
                summary: BatchSummary::default(),
            });
            return Err(e);
        }
    };

    let tasks: Vec<FileTask> = files
        .into_iter()
        .map(|path| FileTask::new(path, spec.clone()))
        .collect();
    let total = tasks.len();
    tx.emit(ProgressEvent::Discovered { count: total });

    let sink = Mutex::new(Vec::with_capacity(total));
    let fault = if total == 0 {
        None
    } else {
        set_state(&state, BatchState::Running);
        let pool = WorkerPool::new(spec.jobs);
        match pool.run(&tasks, &converter, &cancel, &tx, &sink) {
            Ok(()) => None,
            Err(e) => Some(e),
        }
    };

    set_state(&state, BatchState::Finalizing);
    let outcomes: Vec<(FileTask, FileOutcome)> =
        sink.into_inner().expect("outcome sink lock poisoned");
    let summary = BatchSummary::from_outcomes(total, &outcomes);

    tx.emit(ProgressEvent::BatchFinished {
        summary: summary.clone(),
    });

    match fault {
        Some(e) => {
            set_state(&state, BatchState::Failed);
            Err(e)
        }
        None => {
            set_state(&state, BatchState::Done);
            Ok(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentCategory;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn spec(input: &Path, batch: bool, categories: Vec<ContentCategory>) -> JobSpec {
        JobSpec {
            input: input.to_path_buf(),
            batch,
            pattern: "*.xls".to_string(),
            categories,
            output_prefix: "processed_".to_string(),
            output_dir: None,
            jobs: 1,
        }
    }

    fn fake_converter(task: &FileTask) -> Result<Vec<PathBuf>> {
        let name = task.path().display().to_string();
        if name.contains("corrupt") {
            Err(OectError::CorruptFile {
                path: name,
                reason: "not an Excel workbook".to_string(),
            })
        } else {
            Ok(vec![task.path().with_extension("csv")])
        }
    }

    fn drain(rx: &ProgressReceiver) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_empty_directory_yields_zero_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(
                spec(dir.path(), true, vec![ContentCategory::Transfer]),
                fake_converter,
            )
            .unwrap();

        let events = drain(&rx);
        let summary = coordinator.wait().unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total_outputs, 0);
        assert!(summary.is_complete());
        assert!(matches!(events.last(), Some(ProgressEvent::BatchFinished { .. })));
        assert_eq!(coordinator.state(), BatchState::Done);
    }

    #[test]
    fn test_one_corrupt_file_among_three() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.xls", "corrupt.xls", "b.xls"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(
                spec(dir.path(), true, vec![ContentCategory::Transfer]),
                fake_converter,
            )
            .unwrap();
        drain(&rx);

        let summary = coordinator.wait().unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].path.contains("corrupt.xls"));
        assert!(summary.failures[0].reason.contains("not an Excel workbook"));
    }

    #[test]
    fn test_finished_event_is_last_and_unique() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.xls", "b.xls", "c.xls"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(
                spec(dir.path(), true, vec![ContentCategory::Transfer]),
                fake_converter,
            )
            .unwrap();
        let events = drain(&rx);
        coordinator.wait().unwrap();

        let finished: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, ProgressEvent::BatchFinished { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0], events.len() - 1);

        let last_completed = events
            .iter()
            .rposition(|e| matches!(e, ProgressEvent::FileCompleted { .. }))
            .unwrap();
        assert!(last_completed < finished[0]);
    }

    #[test]
    fn test_parallelism_does_not_change_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.xls", "corrupt1.xls", "c.xls", "corrupt2.xls", "e.xls", "f.xls"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let mut counts = Vec::new();
        for jobs in [1, 4] {
            let mut s = spec(dir.path(), true, vec![ContentCategory::Transfer]);
            s.jobs = jobs;
            let mut coordinator = BatchCoordinator::new();
            let rx = coordinator.start(s, fake_converter).unwrap();
            drain(&rx);
            let summary = coordinator.wait().unwrap();
            let failures: Vec<String> =
                summary.failures.iter().map(|f| f.path.clone()).collect();
            counts.push((summary.successful, summary.failed, failures));
        }
        assert_eq!(counts[0], counts[1]);
    }

    #[test]
    fn test_no_categories_rejected_synchronously() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xls"), b"x").unwrap();

        let mut coordinator = BatchCoordinator::new();
        let result = coordinator.start(spec(dir.path(), true, vec![]), fake_converter);
        assert!(matches!(result, Err(OectError::InvalidArgument(_))));
        assert_eq!(coordinator.state(), BatchState::Idle);
    }

    #[test]
    fn test_second_start_while_running() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xls"), b"x").unwrap();

        let slow = |task: &FileTask| -> Result<Vec<PathBuf>> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(vec![task.path().with_extension("csv")])
        };

        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(spec(dir.path(), true, vec![ContentCategory::Transfer]), slow)
            .unwrap();

        let second = coordinator.start(
            spec(dir.path(), true, vec![ContentCategory::Transfer]),
            fake_converter,
        );
        assert!(matches!(second, Err(OectError::AlreadyRunning)));

        // 第一个批处理不受影响
        drain(&rx);
        let summary = coordinator.wait().unwrap();
        assert_eq!(summary.successful, 1);
    }

    #[test]
    fn test_cancel_lets_running_task_finish() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            fs::write(dir.path().join(format!("f{}.xls", i)), b"x").unwrap();
        }

        let slow = |task: &FileTask| -> Result<Vec<PathBuf>> {
            std::thread::sleep(Duration::from_millis(50));
            Ok(vec![task.path().with_extension("csv")])
        };

        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(spec(dir.path(), true, vec![ContentCategory::Transfer]), slow)
            .unwrap();

        // 第一个任务开始后立即取消；它应完成，其余全部跳过
        let mut summary = None;
        let mut cancelled = false;
        while let Some(event) = rx.recv() {
            match event {
                ProgressEvent::FileStarted { .. } if !cancelled => {
                    coordinator.cancel();
                    cancelled = true;
                }
                ProgressEvent::BatchFinished { summary: s } => summary = Some(s),
                _ => {}
            }
        }

        let summary = summary.expect("BatchFinished must still be emitted");
        assert_eq!(summary.total, 6);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 0);
        assert!(!summary.is_complete());
        coordinator.wait().unwrap();
    }

    #[test]
    fn test_pool_fault_still_emits_finished() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.xls", "boom.xls"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let panicking = |task: &FileTask| -> Result<Vec<PathBuf>> {
            if task.path().display().to_string().contains("boom") {
                panic!("out of memory");
            }
            Ok(vec![task.path().with_extension("csv")])
        };

        let mut coordinator = BatchCoordinator::new();
        let rx = coordinator
            .start(
                spec(dir.path(), true, vec![ContentCategory::Transfer]),
                panicking,
            )
            .unwrap();

        let events = drain(&rx);
        assert!(matches!(events.last(), Some(ProgressEvent::BatchFinished { .. })));
        if let Some(ProgressEvent::BatchFinished { summary }) = events.last() {
            assert!(!summary.is_complete());
        }

        assert!(matches!(coordinator.wait(), Err(OectError::PoolFault(_))));
        assert_eq!(coordinator.state(), BatchState::Failed);
    }
}
