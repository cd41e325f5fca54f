use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::input::Account;

fn default_name() -> String {
    "Zentao Weekly Report".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_subject() -> String {
    "Zentao Weekly ({start}至{end})".to_string()
}

/// The `[weekly_report]` section: who is tracked and who gets the report.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyReport {
    users: Vec<Account>,
    to: Vec<String>,
    #[serde(default)]
    cc: Vec<String>,
    #[serde(default)]
    bcc: Vec<String>,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default = "default_subject")]
    subject: String,
}

impl WeeklyReport {
    #[must_use]
    pub fn users(&self) -> &[Account] {
        &self.users
    }

    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Subject template, `{start}` and `{end}` are replaced with the dates.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
