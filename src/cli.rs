//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! 单一功能工具，参数为扁平结构：输入路径 + 批量/类别/输出选项。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/process.rs`

use crate::models::ContentCategory;

use clap::Parser;
use std::path::PathBuf;

/// oect2csv - OECT 测试数据 Excel 转 CSV 工具
#[derive(Parser, Debug)]
#[command(name = "oect2csv")]
#[command(version)]
#[command(about = "Convert OECT measurement Excel workbooks to normalized CSV files", long_about = None)]
pub struct Cli {
    /// Input: Excel workbook (single mode) or directory of workbooks (batch mode)
    pub input: PathBuf,

    /// Process every matching workbook in the input directory
    #[arg(short, long, default_value_t = false)]
    pub batch: bool,

    /// Glob pattern for input files (batch mode)
    #[arg(long, default_value = "*.xls")]
    pub pattern: String,

    /// Sheet categories to extract (comma-separated)
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        default_value = "transfer,transient"
    )]
    pub sheets: Vec<ContentCategory>,

    /// Prefix for generated CSV filenames
    #[arg(long, default_value = "processed_")]
    pub prefix: String,

    /// Output directory (default: next to each input file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Print the final summary as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
