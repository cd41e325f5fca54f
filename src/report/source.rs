use log::{debug, info, trace};
use chrono::NaiveDate;
use mysql::prelude::Queryable;
use mysql::{Conn, Opts};
use thiserror::Error;

use crate::input::toml_input::Database;
use crate::input::Account;
use crate::report::{ColumnError, DetailRow, Query, ReportRow, SummaryRow};
use crate::time::DateWindow;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("no tracked users to query for")]
    NoUsers,
    #[error("failed to connect to the database")]
    Connect(#[source] mysql::Error),
    #[error("failed to run query")]
    Query(#[source] mysql::Error),
    #[error("{date} can not be sent to the database")]
    DateOutOfRange { date: NaiveDate },
    #[error("failed to read row {row} of the result")]
    Conversion {
        row: usize,
        #[source]
        source: ColumnError,
    },
}

/// Read-only access to the time logs of the tracking system.
pub trait ReportSource {
    fn fetch_summary(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<SummaryRow>, DataSourceError>;

    fn fetch_detail(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<DetailRow>, DataSourceError>;
}

/// Queries the Zentao MySQL database, with one connection per query.
pub struct MySqlSource {
    opts: Opts,
}

impl MySqlSource {
    #[must_use]
    pub fn new(database: &Database) -> Self {
        Self {
            opts: database.to_opts(),
        }
    }

    fn query<T: ReportRow>(&self, query: Query) -> Result<Vec<T>, DataSourceError> {
        info!("connecting to the database...");
        let mut conn = Conn::new(self.opts.clone()).map_err(DataSourceError::Connect)?;

        let (sql, params) = query.into_parts();
        trace!("{}", sql);

        let result = conn.exec_iter(sql, params).map_err(DataSourceError::Query)?;

        let mut rows = Vec::new();
        for (index, row) in result.enumerate() {
            let row = row.map_err(DataSourceError::Query)?;
            rows.push(
                T::from_mysql_row(row)
                    .map_err(|source| DataSourceError::Conversion { row: index, source })?,
            );
        }

        debug!("fetched {} rows", rows.len());

        // `conn` is dropped here, which closes the connection on every path
        Ok(rows)
    }
}

impl ReportSource for MySqlSource {
    fn fetch_summary(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<SummaryRow>, DataSourceError> {
        self.query(Query::summary(window, users)?)
    }

    fn fetch_detail(
        &self,
        window: &DateWindow,
        users: &[Account],
    ) -> Result<Vec<DetailRow>, DataSourceError> {
        self.query(Query::detail(window, users)?)
    }
}
