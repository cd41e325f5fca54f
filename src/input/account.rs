use core::str::FromStr;

use derive_more::Display;
use serde::Deserialize;
use thiserror::Error;

/// Zentao stores accounts as `varchar(30)`.
const MAX_ACCOUNT_LEN: usize = 30;

/// A Zentao account name whose time logs are part of the report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Deserialize)]
#[serde(try_from = "String")]
#[display("{}", _0)]
pub struct Account(String);

impl Account {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidAccount {
    #[error("account names must not be empty")]
    Empty,
    #[error("\"{account}\" is longer than 30 characters")]
    TooLong { account: String },
    #[error("\"{account}\" contains the invalid character {character:?}")]
    InvalidCharacter { account: String, character: char },
}

impl FromStr for Account {
    type Err = InvalidAccount;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(InvalidAccount::Empty);
        }

        if value.len() > MAX_ACCOUNT_LEN {
            return Err(InvalidAccount::TooLong {
                account: value.to_string(),
            });
        }

        if let Some(character) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@')))
        {
            return Err(InvalidAccount::InvalidCharacter {
                account: value.to_string(),
                character,
            });
        }

        Ok(Self(value.to_string()))
    }
}

impl TryFrom<String> for Account {
    type Error = InvalidAccount;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}
