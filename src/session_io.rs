//! Saved sessions on disk: a paused session written by one process and
//! resumed by a later one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::SessionFileError;
use crate::types::ExecutionSession;

/// Conventional file name for a saved session inside a run directory.
pub const SESSION_FILENAME: &str = "session.json";

/// Writes `session` to `path` as indented JSON. Missing directories are created.
#[instrument(level = "trace", skip(session), fields(session_id = %session.session_id))]
pub fn save_session(path: &Path, session: &ExecutionSession) -> Result<(), SessionFileError> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    fs::create_dir_all(dir)?;
  }
  let mut writer = BufWriter::new(File::create(path)?);
  serde_json::to_writer_pretty(&mut writer, session)?;
  writer.flush()?;
  debug!(path = %path.display(), steps = session.execution_history.len(), "session saved");
  Ok(())
}

/// Reads a session written by [save_session].
#[instrument(level = "trace")]
pub fn load_session(path: &Path) -> Result<ExecutionSession, SessionFileError> {
  let reader = BufReader::new(File::open(path)?);
  Ok(serde_json::from_reader(reader)?)
}
