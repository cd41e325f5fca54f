use core::fmt;
use std::io;
use std::path::{Path, PathBuf};

use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, MultiPart, SinglePart};
use lettre::{Message, Transport};
use log::{error, info};
use thiserror::Error;

use crate::input::Config;
use crate::time::DateWindow;
use crate::utils;

const NOTICE: &str = "这是自动生成的禅道数据邮件。";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("missing file name in path `{}`", .0.display())]
    MissingFileName(PathBuf),
    #[error("failed to read workbook `{}`", path.display())]
    ReadWorkbook {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid content type: {0}")]
    ContentType(String),
    #[error(transparent)]
    Message(#[from] lettre::error::Error),
    #[error("failed to set up the smtp transport")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("failed to send email: {0}")]
    Send(String),
}

fn attachment_from_file(path: &Path) -> Result<SinglePart, DispatchError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DispatchError::MissingFileName(path.to_path_buf()))?
        .to_string();

    let content = utils::read(path).map_err(|source| DispatchError::ReadWorkbook {
        path: path.to_path_buf(),
        source,
    })?;

    // base64 never rejects a body
    let body = Body::new_with_encoding(content, ContentTransferEncoding::Base64)
        .map_err(|_| DispatchError::ContentType("base64 body".to_string()))?;

    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| DispatchError::ContentType(e.to_string()))?;

    Ok(Attachment::new(file_name).body(body, content_type))
}

/// Mails a rendered workbook to the configured recipients.
pub struct ReportDispatcher<'a> {
    config: &'a Config,
}

impl<'a> ReportDispatcher<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn subject(&self, window: &DateWindow) -> String {
        window.formatted(self.config.subject())
    }

    #[must_use]
    pub fn body(&self) -> String {
        match self.config.zentao_url() {
            Some(url) => format!("{}\n\n{}\n", NOTICE, url),
            None => format!("{}\n", NOTICE),
        }
    }

    /// Builds the message. `Cc` and `Bcc` are only present for non-empty
    /// lists, the envelope contains every recipient.
    pub fn message(&self, window: &DateWindow, workbook: &Path) -> Result<Message, DispatchError> {
        let recipients = self.config.recipients();

        let mut builder = Message::builder()
            .from(self.config.sender().clone())
            .subject(self.subject(window))
            .keep_bcc();

        for mailbox in recipients.to() {
            builder = builder.to(mailbox.clone());
        }

        for mailbox in recipients.cc() {
            builder = builder.cc(mailbox.clone());
        }

        for mailbox in recipients.bcc() {
            builder = builder.bcc(mailbox.clone());
        }

        let message = builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(self.body()))
                .singlepart(attachment_from_file(workbook)?),
        )?;

        Ok(message)
    }

    fn try_send<T>(
        &self,
        transport: &T,
        window: &DateWindow,
        workbook: &Path,
    ) -> Result<(), DispatchError>
    where
        T: Transport,
        T::Error: fmt::Display,
    {
        let message = self.message(window, workbook)?;

        info!(
            "sending email to {} recipients with subject \"{}\"",
            message.envelope().to().len(),
            self.subject(window)
        );

        transport
            .send(&message)
            .map_err(|e| DispatchError::Send(e.to_string()))?;

        Ok(())
    }

    /// Sends the workbook over `transport`. Failures are logged and reported
    /// as `false`, nothing is retried.
    pub fn send<T>(&self, transport: &T, window: &DateWindow, workbook: &Path) -> bool
    where
        T: Transport,
        T::Error: fmt::Display,
    {
        match self.try_send(transport, window, workbook) {
            Ok(()) => {
                info!("sent email successfully");
                true
            }
            Err(e) => {
                error!("{:?}", anyhow::Error::from(e));
                false
            }
        }
    }

    /// Sends the workbook through the configured SMTP server.
    pub fn send_smtp(&self, window: &DateWindow, workbook: &Path) -> bool {
        info!("connecting to smtp server `{}`...", self.config.smtp().host());

        match self.config.smtp().to_transport(self.config.sender()) {
            Ok(transport) => self.send(&transport, window, workbook),
            Err(e) => {
                error!("{:?}", anyhow::Error::from(DispatchError::from(e)));
                false
            }
        }
    }
}
