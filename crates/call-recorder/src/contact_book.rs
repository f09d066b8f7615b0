use crate::{AppError, AppResult};

use call_recorder_core::{ContactLookup, CoreResult, sanitize_number};

use std::{collections::HashMap, fs, io::ErrorKind, panic::Location, path::Path};

use error_location::ErrorLocation;
use serde::Deserialize;
use tracing::{debug, info, instrument};

#[derive(Debug, Default, Deserialize)]
struct ContactsFile {
    #[serde(default)]
    contacts: HashMap<String, String>,
}

/// Number-to-name table read from `contacts.toml`.
///
/// ```toml
/// [contacts]
/// "+1 555 010 2030" = "Alice"
/// ```
///
/// Keys and lookups are compared after [`sanitize_number`], so formatting
/// differences between the file and the platform do not matter.
#[derive(Debug, Default)]
pub struct ContactBook {
    names: HashMap<String, String>,
}

impl ContactBook {
    /// Load the book at `path`. A missing file is an empty book.
    #[track_caller]
    #[instrument]
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "No contact book found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let file: ContactsFile = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse contact book {:?}: {}", path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let names: HashMap<String, String> = file
            .contacts
            .into_iter()
            .map(|(number, name)| (sanitize_number(&number), name))
            .filter(|(number, _)| !number.is_empty())
            .collect();

        info!(path = ?path, contacts = names.len(), "Contact book loaded");

        Ok(Self { names })
    }
}

impl ContactLookup for ContactBook {
    fn lookup(&self, number: &str) -> CoreResult<Option<String>> {
        Ok(self.names.get(&sanitize_number(number)).cloned())
    }
}
