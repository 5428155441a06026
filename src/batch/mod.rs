//! # 批量处理模块
//!
//! 批量转换流水线：文件发现、有界工作池、进度通道与调度器。
//!
//! ## 功能
//! - 自动区分单文件 / 目录输入
//! - 有界并行转换，单文件失败隔离
//! - 跨线程进度事件通道
//! - 结果聚合与最终汇总
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `rayon` 并行处理，`crossbeam-channel` 传递事件

pub mod coordinator;
pub mod pool;
pub mod progress;
pub mod scanner;

pub use coordinator::{BatchCoordinator, BatchState};
pub use pool::WorkerPool;
pub use progress::{ProgressEvent, ProgressReceiver, ProgressSender};
pub use scanner::PathScanner;
