use serde::Deserialize;

use crate::input::toml_input::{Database, Mail, WeeklyReport, Zentao};

/// The whole configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct Global {
    #[serde(default)]
    zentao: Zentao,
    database: Database,
    weekly_report: WeeklyReport,
    mail: Mail,
}

impl Global {
    #[must_use]
    pub fn zentao(&self) -> &Zentao {
        &self.zentao
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    #[must_use]
    pub fn weekly_report(&self) -> &WeeklyReport {
        &self.weekly_report
    }

    #[must_use]
    pub fn mail(&self) -> &Mail {
        &self.mail
    }
}
