//! # 进度事件通道
//!
//! 工作池到观察者（如终端界面）的有界跨线程事件通道。
//!
//! ## 功能
//! - 多生产者、单消费者，事件构造后不可变
//! - 缓冲满时丢弃普通事件（计数可观测），生产者从不无限阻塞
//! - `BatchFinished` 从不丢弃，使用有界超时的阻塞发送
//! - 消费者侧关闭仅为建议性：不中止转换，只停止事件投递
//!
//! ## 依赖关系
//! - 被 `batch/pool.rs`, `batch/coordinator.rs`, `commands/` 使用
//! - 使用 `crossbeam-channel` 有界通道

use crate::models::{BatchSummary, FileOutcome};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 默认事件缓冲容量
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// `BatchFinished` 投递的阻塞上限
const FINISH_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// 进度事件
///
/// 同一文件的 Started/Completed 保序；`BatchFinished` 恰好发出一次，
/// 且严格位于所有 `FileCompleted` 之后。
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// 扫描完成，发现的文件数
    Discovered { count: usize },
    /// 某文件开始转换
    FileStarted { path: PathBuf },
    /// 某文件转换结束
    FileCompleted { path: PathBuf, outcome: FileOutcome },
    /// 批处理结束，附最终汇总
    BatchFinished { summary: BatchSummary },
}

/// 事件发送端（工作线程与调度器持有克隆）
#[derive(Clone)]
pub struct ProgressSender {
    tx: Sender<ProgressEvent>,
    dropped: Arc<AtomicUsize>,
}

impl ProgressSender {
    /// 发出一个事件
    ///
    /// 普通事件在缓冲满时丢弃；`BatchFinished` 阻塞至多
    /// `FINISH_DELIVERY_TIMEOUT`。消费者已断开时静默忽略。
    pub fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchFinished { .. } => {
                let _ = self.tx.send_timeout(event, FINISH_DELIVERY_TIMEOUT);
            }
            _ => {
                if self.tx.try_send(event).is_err() {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// 因缓冲满或消费者断开而丢弃的事件数
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// 事件接收端（单消费者）
pub struct ProgressReceiver {
    rx: Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// 阻塞接收下一个事件；所有发送端关闭后返回 None
    pub fn recv(&self) -> Option<ProgressEvent> {
        self.rx.recv().ok()
    }

    /// 非阻塞接收
    pub fn try_recv(&self) -> Option<ProgressEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// 创建默认容量的进度通道
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    channel_with_capacity(DEFAULT_EVENT_CAPACITY)
}

/// 创建指定容量的进度通道
pub fn channel_with_capacity(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = bounded(capacity);
    (
        ProgressSender {
            tx,
            dropped: Arc::new(AtomicUsize::new(0)),
        },
        ProgressReceiver { rx },
    )
}
