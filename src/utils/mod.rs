use std::fs;
use std::io;
use std::io::{BufReader, Read};
use std::path::Path;

use log::trace;
use serde::de::DeserializeOwned;

pub fn toml_from_reader<R, T>(reader: R) -> anyhow::Result<T>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(reader);
    let mut data = String::with_capacity(4 * 1024);
    reader.read_to_string(&mut data)?;
    Ok(toml::from_str(&data)?)
}

pub fn read(path: impl AsRef<Path>) -> io::Result<Vec<u8>> {
    trace!("reading from: {}", path.as_ref().display());
    fs::read(path)
}

pub fn create_dir_all(path: impl AsRef<Path>) -> io::Result<()> {
    trace!("creating directory: {}", path.as_ref().display());
    fs::create_dir_all(path)
}

/// Removes the file at `path`, returns `true` if there was one.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> io::Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => {
            trace!("removed: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Drops blank entries and trims the rest, the way a comma separated
/// list with trailing commas would be read.
pub fn non_blank<'a>(values: impl IntoIterator<Item = &'a String>) -> impl Iterator<Item = &'a str> {
    values
        .into_iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}
