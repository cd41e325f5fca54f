use std::cell::Cell;
use std::path::Path;

use zentao_weekly_report::input::{Account, Config};
use zentao_weekly_report::report::{ColumnError, DataSourceError, DetailRow, ReportSource, SummaryRow};
use zentao_weekly_report::time::DateWindow;

#[must_use]
pub fn make_config(output_dir: &Path, extra: &str) -> Config {
    let input = format!(
        concat!(
            //
            "[database]\n",
            "host = \"127.0.0.1\"\n",
            "user = \"reader\"\n",
            "password = \"secret\"\n",
            "\n",
            "[weekly_report]\n",
            "users = [\"alice\", \"bob\"]\n",
            "to = [\"lead@example.com\"]\n",
            "{extra}",
            "\n",
            "[mail]\n",
            "from = \"reports@example.com\"\n",
            "\n",
            "[mail.smtp]\n",
            "host = \"smtp.example.com\"\n",
            "password = \"secret\"\n",
        ),
        extra = extra
    );

    let mut builder = Config::try_from_toml_str(&input).expect("config should be valid");
    builder.output_dir(output_dir);
    builder.build()
}

/// Serves fixed rows and remembers what it was asked for.
#[derive(Default)]
pub struct MemorySource {
    pub summary: Vec<SummaryRow>,
    pub detail: Vec<DetailRow>,
    pub fail: bool,
    pub queries: Cell<usize>,
    pub window: Cell<Option<DateWindow>>,
}

impl MemorySource {
    fn record(&self, window: &DateWindow, users: &[Account]) -> Result<(), DataSourceError> {
        assert!(!users.is_empty(), "tracked users should never be empty");
        self.queries.set(self.queries.get() + 1);
        self.window.set(Some(*window));

        if self.fail {
            Err(DataSourceError::Conversion {
                row: 0,
                source: ColumnError::Missing { column: "consumed" },
            })
        } else {
            Ok(())
        }
    }
}

impl ReportSource for MemorySource {
    fn fetch_summary(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<SummaryRow>, DataSourceError> {
        self.record(window, users)?;
        Ok(self.summary.clone())
    }

    fn fetch_detail(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<DetailRow>, DataSourceError> {
        self.record(window, users)?;
        Ok(self.detail.clone())
    }
}
