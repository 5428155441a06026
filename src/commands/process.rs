//! # 处理命令实现
//!
//! 终端观察者：启动批处理调度器，排空进度通道，渲染进度与汇总。
//!
//! ## 功能
//! - 从 CLI 参数构造 JobSpec
//! - 扫描阶段显示 spinner，转换阶段显示进度条
//! - 逐文件打印成功 / 警告日志行
//! - 结束后打印汇总、失败列表（表格）或 JSON
//!
//! ## 依赖关系
//! - 使用 `cli.rs` 定义的参数
//! - 使用 `batch/`, `converter/excel.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{BatchCoordinator, ProgressEvent};
use crate::cli::Cli;
use crate::converter::ExcelConverter;
use crate::error::{OectError, Result};
use crate::models::{BatchSummary, FileOutcome, JobSpec};
use crate::utils::{output, progress};

use indicatif::ProgressBar;
use std::fs;
use tabled::settings::Style;
use tabled::Table;

/// 执行处理命令
pub fn execute(cli: Cli) -> Result<()> {
    output::print_header("OECT Excel -> CSV");

    if let Some(dir) = &cli.output {
        fs::create_dir_all(dir).map_err(|e| OectError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }

    let spec = JobSpec {
        input: cli.input,
        batch: cli.batch,
        pattern: cli.pattern,
        categories: cli.sheets,
        output_prefix: cli.prefix,
        output_dir: cli.output,
        jobs: cli.jobs,
    };

    output::print_info(&format!("Sheet categories: {}", spec.category_list()));

    let mut coordinator = BatchCoordinator::new();
    let rx = coordinator.start(spec, ExcelConverter::new())?;

    let spinner = progress::create_spinner("Scanning for workbooks");
    let mut bar: Option<ProgressBar> = None;
    let mut summary: Option<BatchSummary> = None;

    while let Some(event) = rx.recv() {
        match event {
            ProgressEvent::Discovered { count } => {
                spinner.finish_and_clear();
                output::print_info(&format!("Found {} workbook(s)", count));
                if count > 0 {
                    bar = Some(progress::create_progress_bar(count as u64, "Converting"));
                }
            }
            ProgressEvent::FileStarted { .. } => {}
            ProgressEvent::FileCompleted { path, outcome } => {
                if let Some(bar) = &bar {
                    bar.inc(1);
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string());
                    match outcome {
                        FileOutcome::Success { outputs } => bar.suspend(|| {
                            for out in &outputs {
                                output::print_produced(&name, &out.display().to_string());
                            }
                        }),
                        FileOutcome::Failure { message } => bar.suspend(|| {
                            output::print_warning(&format!("{}: {}", name, message));
                        }),
                    }
                }
            }
            ProgressEvent::BatchFinished { summary: s } => {
                if let Some(bar) = &bar {
                    bar.finish_and_clear();
                }
                summary = Some(s);
                break;
            }
        }
    }
    spinner.finish_and_clear();

    if let Some(summary) = &summary {
        report(summary, cli.json)?;
    }

    // 致命错误（池故障）在汇总打印之后传播给 main
    coordinator.wait()?;
    Ok(())
}

/// 打印最终汇总
fn report(summary: &BatchSummary, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    output::print_separator();
    output::print_done(&format!(
        "{} succeeded, {} failed, {} CSV file(s) written",
        summary.successful, summary.failed, summary.total_outputs
    ));

    if !summary.failures.is_empty() {
        output::print_warning("Failed files:");
        println!("{}", Table::new(&summary.failures).with(Style::sharp()));
    }

    if !summary.is_complete() {
        output::print_warning(&format!(
            "Run incomplete: {} of {} workbook(s) were not processed",
            summary.total - summary.successful - summary.failed,
            summary.total
        ));
    }

    Ok(())
}
