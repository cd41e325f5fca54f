mod dispatch;
mod utils;
mod xlsx_render;

pub mod input;
pub mod report;
pub mod time;

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use lettre::Transport;
use log::info;

pub use crate::dispatch::{DispatchError, ReportDispatcher};
pub use crate::xlsx_render::*;

use crate::input::Config;
use crate::report::{MySqlSource, ReportSource};
use crate::time::{previous_week_range, DateWindow};

/// One run of the report for the week before `reference`.
pub struct WeeklyReport<'a> {
    config: &'a Config,
    window: DateWindow,
}

impl<'a> WeeklyReport<'a> {
    #[must_use]
    pub fn new(config: &'a Config, reference: NaiveDate) -> Self {
        Self {
            config,
            window: previous_week_range(reference),
        }
    }

    #[must_use]
    pub const fn window(&self) -> DateWindow {
        self.window
    }

    /// Queries both views and renders the workbook, returns its path.
    pub fn make<S: ReportSource>(&self, source: &S) -> anyhow::Result<PathBuf> {
        info!("generating report for {}", self.window);

        let summary = source
            .fetch_summary(&self.window, self.config.users())
            .context("failed to query the summary data")?;
        info!("fetched {} summary rows", summary.len());

        let detail = source
            .fetch_detail(&self.window, self.config.users())
            .context("failed to query the detail data")?;
        info!("fetched {} detail rows", detail.len());

        let render = XlsxRender::new(self.config, &self.window);
        let workbook = render
            .render(&summary, &detail)
            .with_context(|| format!("failed to write `{}`", render.output().display()))?;

        Ok(workbook)
    }

    /// Makes the workbook and mails it. Query and render failures are
    /// errors, a failed delivery is `Ok(false)` and leaves the workbook on
    /// disk.
    pub fn run<S, T>(&self, source: &S, transport: &T) -> anyhow::Result<bool>
    where
        S: ReportSource,
        T: Transport,
        T::Error: fmt::Display,
    {
        let workbook = self.make(source)?;

        Ok(ReportDispatcher::new(self.config).send(transport, &self.window, &workbook))
    }
}

/// Renders the workbook from the configured database without sending it.
pub fn make_weekly_report(config: &Config, reference: NaiveDate) -> anyhow::Result<PathBuf> {
    WeeklyReport::new(config, reference).make(&MySqlSource::new(config.database()))
}

/// Renders the workbook from the configured database and mails it through
/// the configured SMTP server.
pub fn generate_weekly_report(config: &Config, reference: NaiveDate) -> anyhow::Result<bool> {
    let report = WeeklyReport::new(config, reference);
    let workbook = report.make(&MySqlSource::new(config.database()))?;

    Ok(ReportDispatcher::new(config).send_smtp(&report.window(), &workbook))
}
