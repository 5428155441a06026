//! # oect2csv - OECT 测试数据 Excel 转 CSV 工具
//!
//! 把 OECT 性能测试生成的 Excel 工作簿转换为规范化 CSV，
//! 支持单文件与整目录并行批量处理。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli.rs      (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   ├── batch/      (扫描、工作池、进度通道、调度器)
//!   ├── converter/  (Excel -> CSV 转换)
//!   ├── models/     (作业与结果数据模型)
//!   ├── utils/      (输出与进度条工具)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod converter;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
