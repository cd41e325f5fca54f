use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lettre::address::AddressError;
use lettre::message::Mailbox;
use thiserror::Error;

use crate::input::toml_input::{self, Database, Smtp};
use crate::input::Account;
use crate::utils;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no tracked users in `weekly_report.users`")]
    NoUsers,
    #[error("`weekly_report.to` needs at least one recipient")]
    NoRecipients,
    #[error("invalid mailbox \"{value}\" in `{field}`")]
    InvalidMailbox {
        field: &'static str,
        value: String,
        #[source]
        source: AddressError,
    },
}

/// Who receives the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipients {
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
}

impl Recipients {
    #[must_use]
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    #[must_use]
    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    #[must_use]
    pub fn bcc(&self) -> &[Mailbox] {
        &self.bcc
    }
}

fn parse_mailboxes(field: &'static str, values: &[String]) -> Result<Vec<Mailbox>, ConfigError> {
    utils::non_blank(values)
        .map(|value| {
            value
                .parse::<Mailbox>()
                .map_err(|source| ConfigError::InvalidMailbox {
                    field,
                    value: value.to_string(),
                    source,
                })
        })
        .collect()
}

/// Validated, immutable settings of a run.
#[derive(Debug, Clone)]
pub struct Config {
    zentao_url: Option<String>,
    database: Database,
    users: Vec<Account>,
    recipients: Recipients,
    sender: Mailbox,
    smtp: Smtp,
    report_name: String,
    output_dir: PathBuf,
    subject: String,
}

pub struct ConfigBuilder {
    global: toml_input::Global,
    users: Vec<Account>,
    recipients: Recipients,
    sender: Mailbox,
    output_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    fn new(global: toml_input::Global) -> Result<Self, ConfigError> {
        let report = global.weekly_report();

        let mut users: Vec<Account> = Vec::with_capacity(report.users().len());
        for user in report.users() {
            if !users.contains(user) {
                users.push(user.clone());
            }
        }

        if users.is_empty() {
            return Err(ConfigError::NoUsers);
        }

        let recipients = Recipients {
            to: parse_mailboxes("weekly_report.to", report.to())?,
            cc: parse_mailboxes("weekly_report.cc", report.cc())?,
            bcc: parse_mailboxes("weekly_report.bcc", report.bcc())?,
        };

        if recipients.to.is_empty() {
            return Err(ConfigError::NoRecipients);
        }

        let sender = global
            .mail()
            .sender()
            .trim()
            .parse::<Mailbox>()
            .map_err(|source| ConfigError::InvalidMailbox {
                field: "mail.from",
                value: global.mail().sender().to_string(),
                source,
            })?;

        Ok(Self {
            global,
            users,
            recipients,
            sender,
            output_dir: None,
        })
    }

    /// Overrides `weekly_report.output_dir`.
    pub fn output_dir(&mut self, output_dir: impl Into<PathBuf>) -> &mut Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        let report = self.global.weekly_report();

        Config {
            zentao_url: self.global.zentao().url().map(ToString::to_string),
            database: self.global.database().clone(),
            users: self.users,
            recipients: self.recipients,
            sender: self.sender,
            smtp: self.global.mail().smtp().clone(),
            report_name: report.name().to_string(),
            output_dir: self
                .output_dir
                .unwrap_or_else(|| report.output_dir().to_path_buf()),
            subject: report.subject().to_string(),
        }
    }
}

impl Config {
    pub fn try_from_toml(global: toml_input::Global) -> anyhow::Result<ConfigBuilder> {
        Ok(ConfigBuilder::new(global)?)
    }

    pub fn try_from_toml_str(input: &str) -> anyhow::Result<ConfigBuilder> {
        let global: toml_input::Global = toml::from_str(input)?;

        Self::try_from_toml(global)
    }

    pub fn try_from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<ConfigBuilder> {
        let path = path.as_ref();
        let global: toml_input::Global = utils::toml_from_reader(File::open(path)?)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        Self::try_from_toml(global).with_context(|| format!("invalid config `{}`", path.display()))
    }

    #[must_use]
    pub fn zentao_url(&self) -> Option<&str> {
        self.zentao_url.as_deref()
    }

    #[must_use]
    pub fn database(&self) -> &Database {
        &self.database
    }

    #[must_use]
    pub fn users(&self) -> &[Account] {
        &self.users
    }

    #[must_use]
    pub fn recipients(&self) -> &Recipients {
        &self.recipients
    }

    #[must_use]
    pub fn sender(&self) -> &Mailbox {
        &self.sender
    }

    #[must_use]
    pub fn smtp(&self) -> &Smtp {
        &self.smtp
    }

    #[must_use]
    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
