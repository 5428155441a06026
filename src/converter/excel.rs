//! # Excel 转 CSV 转换器
//!
//! 读取 OECT 测量工作簿，把匹配类别的工作表各写出一个 CSV。
//!
//! ## 功能
//! - 使用 `calamine` 读取 .xls / .xlsx 工作簿
//! - 按名称关键字识别工作表类别（不区分大小写）
//! - 输出文件名由输入文件名 + 前缀确定，保证并行写入不冲突
//!
//! ## 依赖关系
//! - 实现 `converter/mod.rs` 的 Converter 契约
//! - 使用 `csv` 库写出数据

use crate::converter::Converter;
use crate::error::{OectError, Result};
use crate::models::FileTask;

use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

/// 支持的工作簿扩展名
const SUPPORTED_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Excel 工作簿转换器
///
/// 无状态，可被所有工作线程共享。
pub struct ExcelConverter;

impl ExcelConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExcelConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for ExcelConverter {
    fn convert(&self, task: &FileTask) -> Result<Vec<PathBuf>> {
        let path = task.path();
        check_extension(path)?;

        let mut workbook = open_workbook_auto(path).map_err(|e| OectError::CorruptFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // 工作表按工作簿内原始顺序处理，输出列表保持该顺序
        let sheet_names = workbook.sheet_names();
        let spec = task.spec();
        let matching: Vec<String> = sheet_names
            .into_iter()
            .filter(|name| spec.categories.iter().any(|c| c.matches(name)))
            .collect();

        if matching.is_empty() {
            return Err(OectError::NoMatchingSheet {
                path: path.display().to_string(),
                categories: spec.category_list(),
            });
        }

        let output_dir = task.output_dir();
        let mut outputs = Vec::with_capacity(matching.len());

        for sheet_name in &matching {
            let range = workbook
                .worksheet_range(sheet_name)
                .map_err(|e| OectError::CorruptFile {
                    path: path.display().to_string(),
                    reason: format!("sheet '{}': {}", sheet_name, e),
                })?;

            let output_path = output_path_for(path, sheet_name, &spec.output_prefix, &output_dir);
            write_sheet_csv(&range, &output_path)?;
            outputs.push(output_path);
        }

        Ok(outputs)
    }
}

/// 扩展名检查
fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(OectError::UnsupportedFormat(path.display().to_string()))
    }
}

/// 输出路径：`{prefix}{输入文件名主干}_{工作表名}.csv`
///
/// 仅由输入文件名与前缀决定，两个工作线程不会争用同一输出路径。
fn output_path_for(input: &Path, sheet_name: &str, prefix: &str, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    output_dir.join(format!(
        "{}{}_{}.csv",
        prefix,
        stem,
        sanitize_component(sheet_name)
    ))
}

/// 工作表名转安全文件名片段
fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// 写出一个工作表为 CSV
fn write_sheet_csv(range: &calamine::Range<Data>, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for row in range.rows() {
        let record: Vec<String> = row.iter().map(cell_to_string).collect();
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| OectError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 单元格规范化
///
/// 整数值的浮点不带尾随 ".0"，错误单元格输出为空。
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}
