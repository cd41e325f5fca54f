use mysql::{Opts, OptsBuilder};
use serde::Deserialize;

fn default_port() -> u16 {
    3306
}

fn default_name() -> String {
    "zentao".to_string()
}

/// Connection parameters of the Zentao MySQL database.
#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    user: String,
    password: String,
    #[serde(default = "default_name")]
    name: String,
}

impl Database {
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn to_opts(&self) -> Opts {
        OptsBuilder::new()
            .ip_or_hostname(Some(self.host.as_str()))
            .tcp_port(self.port)
            .user(Some(self.user.as_str()))
            .pass(Some(self.password.as_str()))
            .db_name(Some(self.name.as_str()))
            .into()
    }
}
