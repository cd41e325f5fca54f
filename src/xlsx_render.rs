use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use thiserror::Error;

use crate::input::Config;
use crate::report::{DetailRow, SummaryRow};
use crate::time::DateWindow;
use crate::utils;

pub const SUMMARY_SHEET: &str = "汇总数据";
pub const SUMMARY_HEADERS: [&str; 5] = ["完成者", "所属迭代", "所属模块", "关闭人", "消耗工时"];
const SUMMARY_WIDTHS: [f64; 5] = [10.0, 30.0, 30.0, 15.0, 10.0];

pub const DETAIL_SHEET: &str = "明细数据";
pub const DETAIL_HEADERS: [&str; 12] = [
    "任务ID",
    "所属迭代",
    "所属模块",
    "任务名称",
    "需求ID",
    "完成人",
    "关闭人",
    "完成时间",
    "关闭时间",
    "最初预计",
    "总消耗",
    "预计剩余",
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
    #[error("failed to prepare `{}`", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `<report-name> (<start> ~ <end>).xlsx`
#[must_use]
pub fn workbook_file_name(report_name: &str, window: &DateWindow) -> String {
    format!("{} ({}).xlsx", report_name, window)
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[&str],
    format: &Format,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as ColNum, *header, format)?;
    }

    Ok(())
}

// NULL columns stay blank
fn write_text(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: Option<&str>,
) -> Result<(), XlsxError> {
    if let Some(value) = value {
        sheet.write_string(row, col, value)?;
    }

    Ok(())
}

fn write_number(
    sheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: Option<f64>,
) -> Result<(), XlsxError> {
    if let Some(value) = value {
        sheet.write_number(row, col, value)?;
    }

    Ok(())
}

fn summary_sheet(rows: &[SummaryRow], header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(SUMMARY_SHEET)?;

    write_headers(&mut sheet, &SUMMARY_HEADERS, header)?;
    for (col, width) in SUMMARY_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as ColNum, *width)?;
    }

    for (index, entry) in rows.iter().enumerate() {
        let row = index as RowNum + 1;
        write_text(&mut sheet, row, 0, entry.finished_by.as_deref())?;
        write_text(&mut sheet, row, 1, entry.sprint.as_deref())?;
        write_text(&mut sheet, row, 2, entry.module.as_deref())?;
        write_text(&mut sheet, row, 3, entry.closed_by.as_deref())?;
        sheet.write_number(row, 4, entry.consumed)?;
    }

    Ok(sheet)
}

fn detail_sheet(rows: &[DetailRow], header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(DETAIL_SHEET)?;

    write_headers(&mut sheet, &DETAIL_HEADERS, header)?;

    for (index, entry) in rows.iter().enumerate() {
        let row = index as RowNum + 1;
        sheet.write_number(row, 0, entry.task_id as f64)?;
        write_text(&mut sheet, row, 1, entry.sprint.as_deref())?;
        write_text(&mut sheet, row, 2, entry.module.as_deref())?;
        write_text(&mut sheet, row, 3, entry.title.as_deref())?;
        write_number(&mut sheet, row, 4, entry.story_id.map(|id| id as f64))?;
        write_text(&mut sheet, row, 5, entry.finished_by.as_deref())?;
        write_text(&mut sheet, row, 6, entry.closed_by.as_deref())?;
        write_text(&mut sheet, row, 7, entry.finished_date.as_deref())?;
        write_text(&mut sheet, row, 8, entry.closed_date.as_deref())?;
        write_number(&mut sheet, row, 9, entry.estimate)?;
        sheet.write_number(row, 10, entry.consumed)?;
        write_number(&mut sheet, row, 11, entry.remaining)?;
    }

    Ok(sheet)
}

/// Writes the summary and detail rows into a two sheet workbook.
pub struct XlsxRender {
    output: PathBuf,
}

impl XlsxRender {
    #[must_use]
    pub fn new(config: &Config, window: &DateWindow) -> Self {
        Self::with_output(
            config
                .output_dir()
                .join(workbook_file_name(config.report_name(), window)),
        )
    }

    #[must_use]
    pub fn with_output(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
        }
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Renders the workbook, replacing any previous file at the output path.
    pub fn render(
        &self,
        summary: &[SummaryRow],
        detail: &[DetailRow],
    ) -> Result<PathBuf, RenderError> {
        let prepare = |source: io::Error| RenderError::Prepare {
            path: self.output.clone(),
            source,
        };

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            utils::create_dir_all(parent).map_err(prepare)?;
        }

        if utils::remove_file_if_exists(&self.output).map_err(prepare)? {
            debug!("removed previous report `{}`", self.output.display());
        }

        let header = Format::new().set_bold();

        let mut workbook = Workbook::new();
        workbook.push_worksheet(summary_sheet(summary, &header)?);
        workbook.push_worksheet(detail_sheet(detail, &header)?);
        workbook.save(&self.output)?;

        info!(
            "wrote {} summary and {} detail rows to `{}`",
            summary.len(),
            detail.len(),
            self.output.display()
        );

        Ok(self.output.clone())
    }
}
