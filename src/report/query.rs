use chrono::{Datelike, NaiveDate};
use mysql::{Params, Value};

use crate::input::Account;
use crate::report::DataSourceError;
use crate::time::DateWindow;

/// Statuses counted in the summary sheet.
pub const SUMMARY_STATUSES: &[&str] = &["closed"];
/// Statuses listed in the detail sheet.
pub const DETAIL_STATUSES: &[&str] = &["closed", "done"];

// Hours per task logged by the tracked accounts inside the window.
// Parameters: start, end, accounts.
const TIME_LOGS: &str = "
    SELECT task, ROUND(SUM(consumed), 1) AS consumed
    FROM zt_taskestimate
    WHERE date >= ? AND date <= ?
    AND account IN ({accounts})
    GROUP BY task";

const SUMMARY: &str = "
SELECT
    B.finishedBy AS finished_by,
    C.name AS sprint_name,
    D.name AS module_name,
    GROUP_CONCAT(DISTINCT B.closedBy SEPARATOR ',') AS closed_by,
    SUM(A.consumed) AS consumed
FROM ({time_logs}
) A
LEFT JOIN zt_task B ON A.task = B.id
LEFT JOIN zt_project C ON B.project = C.id
LEFT JOIN zt_module D ON B.module = D.id
WHERE B.status IN ({statuses})
GROUP BY finished_by, sprint_name, module_name";

const DETAIL: &str = "
SELECT
    A.task AS task_id,
    C.name AS sprint_name,
    D.name AS module_name,
    B.name AS task_name,
    B.story AS story_id,
    B.finishedBy AS finished_by,
    B.closedBy AS closed_by,
    CAST(B.finishedDate AS CHAR) AS finished_date,
    CAST(B.closedDate AS CHAR) AS closed_date,
    ROUND(B.estimate, 2) AS estimate,
    A.consumed AS consumed,
    ROUND(B.`left`, 2) AS remaining
FROM ({time_logs}
) A
LEFT JOIN zt_task B ON A.task = B.id
LEFT JOIN zt_project C ON B.project = C.id
LEFT JOIN zt_module D ON B.module = D.id
WHERE B.status IN ({statuses})
ORDER BY A.task ASC";

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

// `DATE` covers the years 1000 to 9999
fn date_value(date: NaiveDate) -> Result<Value, DataSourceError> {
    let year = u16::try_from(date.year())
        .ok()
        .filter(|year| (1000..=9999).contains(year))
        .ok_or(DataSourceError::DateOutOfRange { date })?;

    Ok(Value::Date(
        year,
        date.month() as u8,
        date.day() as u8,
        0,
        0,
        0,
        0,
    ))
}

fn text_value(value: &str) -> Value {
    Value::Bytes(value.as_bytes().to_vec())
}

/// A statement together with its positional parameters.
///
/// Every value coming from the configuration is bound, the statement text
/// only ever contains placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    sql: String,
    params: Vec<Value>,
}

impl Query {
    fn build(
        template: &str,
        window: &DateWindow,
        users: &[Account],
        statuses: &[&str],
    ) -> Result<Self, DataSourceError> {
        if users.is_empty() {
            return Err(DataSourceError::NoUsers);
        }

        let time_logs = TIME_LOGS.replace("{accounts}", &placeholders(users.len()));
        let sql = template
            .replace("{time_logs}", &time_logs)
            .replace("{statuses}", &placeholders(statuses.len()));

        let mut params = Vec::with_capacity(2 + users.len() + statuses.len());
        params.push(date_value(window.start())?);
        params.push(date_value(window.end())?);
        params.extend(users.iter().map(|user| text_value(user.as_str())));
        params.extend(statuses.iter().map(|status| text_value(status)));

        Ok(Self { sql, params })
    }

    /// Total hours per finisher, sprint and module of closed tasks.
    pub fn summary(window: &DateWindow, users: &[Account]) -> Result<Self, DataSourceError> {
        Self::build(SUMMARY, window, users, SUMMARY_STATUSES)
    }

    /// One row per closed or done task, ordered by task id.
    pub fn detail(window: &DateWindow, users: &[Account]) -> Result<Self, DataSourceError> {
        Self::build(DETAIL, window, users, DETAIL_STATUSES)
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Params) {
        (self.sql, Params::Positional(self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::str::FromStr;

    use pretty_assertions::assert_eq;

    use crate::report::{DETAIL_COLUMNS, SUMMARY_COLUMNS};
    use crate::time::previous_week_range;

    fn window() -> DateWindow {
        previous_week_range(NaiveDate::from_ymd_opt(2024, 6, 12).unwrap())
    }

    fn users(names: &[&str]) -> Vec<Account> {
        names
            .iter()
            .map(|name| Account::from_str(name).unwrap())
            .collect()
    }

    #[test]
    fn test_summary_only_counts_closed_tasks() {
        let query = Query::summary(&window(), &users(&["alice", "bob"])).unwrap();

        assert!(query.sql().contains("WHERE B.status IN (?)"));
        assert!(query.sql().contains("GROUP BY finished_by, sprint_name, module_name"));
        assert!(query.sql().contains("GROUP_CONCAT(DISTINCT B.closedBy SEPARATOR ',')"));
        assert_eq!(query.params().last(), Some(&text_value("closed")));
        assert!(!query.params().contains(&text_value("done")));
    }

    #[test]
    fn test_detail_lists_closed_and_done_tasks() {
        let query = Query::detail(&window(), &users(&["alice"])).unwrap();

        assert!(query.sql().contains("WHERE B.status IN (?, ?)"));
        assert!(query.sql().contains("ROUND(SUM(consumed), 1)"));
        assert!(query.sql().contains("GROUP BY task\n"));
        assert!(query.sql().trim_end().ends_with("ORDER BY A.task ASC"));
        assert_eq!(
            &query.params()[3..],
            &[text_value("closed"), text_value("done")]
        );
    }

    #[test]
    fn test_accounts_are_bound() {
        let query = Query::detail(&window(), &users(&["alice", "bob", "carol"])).unwrap();

        assert!(query.sql().contains("account IN (?, ?, ?)"));
        assert!(!query.sql().contains("alice"));
        assert_eq!(
            query.sql().matches('?').count(),
            query.params().len(),
            "every parameter needs a placeholder"
        );
        assert_eq!(
            query.params(),
            &[
                Value::Date(2024, 6, 3, 0, 0, 0, 0),
                Value::Date(2024, 6, 9, 0, 0, 0, 0),
                text_value("alice"),
                text_value("bob"),
                text_value("carol"),
                text_value("closed"),
                text_value("done"),
            ]
        );
    }

    #[test]
    fn test_tracked_users_apply_to_both_queries() {
        let users = users(&["alice", "bob"]);
        let summary = Query::summary(&window(), &users).unwrap();
        let detail = Query::detail(&window(), &users).unwrap();

        assert_eq!(&summary.params()[..4], &detail.params()[..4]);
    }

    #[test]
    fn test_no_users() {
        assert!(matches!(
            Query::summary(&window(), &[]),
            Err(DataSourceError::NoUsers)
        ));
    }

    #[test]
    fn test_selected_columns_match_row_mapping() {
        let users = users(&["alice"]);
        let summary = Query::summary(&window(), &users).unwrap();
        let detail = Query::detail(&window(), &users).unwrap();

        for column in SUMMARY_COLUMNS {
            assert!(
                summary.sql().contains(&format!(" AS {},", column))
                    || summary.sql().contains(&format!(" AS {}\n", column)),
                "summary query does not select `{}`",
                column
            );
        }

        for column in DETAIL_COLUMNS {
            assert!(
                detail.sql().contains(&format!(" AS {},", column))
                    || detail.sql().contains(&format!(" AS {}\n", column)),
                "detail query does not select `{}`",
                column
            );
        }
    }

    #[test]
    fn test_float_columns_are_rounded() {
        let query = Query::detail(&window(), &users(&["alice"])).unwrap();

        assert!(query.sql().contains("ROUND(B.estimate, 2) AS estimate,"));
        assert!(query.sql().contains("ROUND(B.`left`, 2) AS remaining\n"));
    }

    #[test]
    fn test_dates_outside_of_mysql_range() {
        let far_future = previous_week_range(NaiveDate::from_ymd_opt(70_000, 1, 20).unwrap());
        assert!(matches!(
            Query::detail(&far_future, &users(&["alice"])),
            Err(DataSourceError::DateOutOfRange { .. })
        ));

        let ancient = previous_week_range(NaiveDate::from_ymd_opt(-5, 3, 1).unwrap());
        assert!(matches!(
            Query::summary(&ancient, &users(&["alice"])),
            Err(DataSourceError::DateOutOfRange { .. })
        ));
    }
}
