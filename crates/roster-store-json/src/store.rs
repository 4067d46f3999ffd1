//! [`JsonStore`] — [`RosterStore`] over a single JSON file.

use std::{
  fs,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use roster_model::{Roster, RosterStore};
use tracing::{debug, info};

use crate::{Error, Result, encode::RawRoster};

#[derive(Debug, Clone)]
pub struct JsonStore {
  path: PathBuf,
}

impl JsonStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  /// Sibling file written first and renamed over the real one, so a crash
  /// mid-write never leaves a truncated document.
  fn staging_path(&self) -> PathBuf {
    let mut name = self.path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    self.path.with_file_name(name)
  }
}

impl RosterStore for JsonStore {
  type Error = Error;

  fn load(&self) -> Result<Option<Roster>> {
    let text = match fs::read_to_string(&self.path) {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        info!(path = %self.path.display(), "no roster file, starting empty");
        return Ok(None);
      }
      Err(e) => return Err(Error::io(&self.path)(e)),
    };

    let raw: RawRoster = serde_json::from_str(&text)?;
    let roster = raw.into_roster()?;
    info!(
      path = %self.path.display(),
      persons = roster.persons().len(),
      groups = roster.groups().len(),
      consultations = roster.consultations().len(),
      "loaded roster"
    );
    Ok(Some(roster))
  }

  fn save(&self, roster: &Roster) -> Result<()> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(Error::io(parent))?;
    }

    let text = serde_json::to_string_pretty(&RawRoster::from_roster(roster))?;
    let staging = self.staging_path();
    debug!(path = %staging.display(), bytes = text.len(), "writing staging file");
    fs::write(&staging, text).map_err(Error::io(&staging))?;
    fs::rename(&staging, &self.path).map_err(Error::io(&self.path))?;

    info!(
      path = %self.path.display(),
      persons = roster.persons().len(),
      "saved roster"
    );
    Ok(())
  }
}
