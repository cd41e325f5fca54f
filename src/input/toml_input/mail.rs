use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::{self, SmtpTransport};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Smtp {
    host: String,
    username: Option<String>,
    password: String,
    #[serde(default)]
    use_starttls: bool,
    port: Option<u16>,
}

impl Smtp {
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Builds an authenticated transport.
    ///
    /// Without `use_starttls` this connects with implicit TLS on port 465,
    /// otherwise it upgrades a plain connection on port 587. An explicit
    /// `port` overrides either default. The login defaults to the address
    /// of `sender`.
    pub fn to_transport(&self, sender: &Mailbox) -> Result<SmtpTransport, smtp::Error> {
        let relay = self.host.as_str();
        let mut builder = {
            if self.use_starttls {
                SmtpTransport::starttls_relay(relay)
            } else {
                SmtpTransport::relay(relay)
            }
        }?;

        if let Some(port) = self.port {
            builder = builder.port(port);
        }

        let username = self
            .username
            .clone()
            .unwrap_or_else(|| sender.email.to_string());

        Ok(builder
            .credentials(Credentials::new(username, self.password.clone()))
            .build())
    }
}

/// The `[mail]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Mail {
    from: String,
    smtp: Smtp,
}

impl Mail {
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.from
    }

    #[must_use]
    pub fn smtp(&self) -> &Smtp {
        &self.smtp
    }
}
