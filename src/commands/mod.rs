//! # 命令执行模块
//!
//! 实现命令行入口的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli.rs`, `batch/`, `converter/`, `utils/`
//! - 子模块: process

pub mod process;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    process::execute(cli)
}
