//! Loading and saving parameters through the registered file formats.

use super::*;
use shared_types::LoadSaveError;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{info, warn};

impl ConfigurationManager {
    /// Load parameters from a file. Unless `keep_old`, every component is
    /// destroyed and the tree emptied first. The format is guessed from
    /// the extension when `format` is empty or absent. Returns false on
    /// failure, after logging it.
    pub fn load_parameters(
        &self,
        filename: impl AsRef<Path>,
        keep_old: bool,
        format: Option<&str>,
    ) -> bool {
        let filename = filename.as_ref();
        match self.try_load_parameters(filename, keep_old, format) {
            Ok(()) => {
                info!(file = %filename.display(), "[Factory] Parameters loaded");
                true
            }
            Err(e) => {
                warn!(file = %filename.display(), error = %e, "[Factory] Could not load parameters");
                false
            }
        }
    }

    pub fn try_load_parameters(
        &self,
        filename: &Path,
        keep_old: bool,
        format: Option<&str>,
    ) -> Result<(), LoadSaveError> {
        // Resolve the format before touching the tree.
        let resolved = self.shared.formats.resolve(filename, format)?;
        let _guard = self.lock();
        if !keep_old {
            self.clear_all();
        }
        let mut target = self.clone();
        self.shared
            .formats
            .load_file(filename, Some(&resolved.name), &mut target)
    }

    /// Save every parameter to a file. Returns false on failure, after
    /// logging it.
    pub fn save_parameters(&self, filename: impl AsRef<Path>, format: Option<&str>) -> bool {
        let filename = filename.as_ref();
        let _guard = self.lock();
        match self.shared.formats.save_file(filename, format, self) {
            Ok(()) => {
                info!(file = %filename.display(), "[Factory] Parameters saved");
                true
            }
            Err(e) => {
                warn!(file = %filename.display(), error = %e, "[Factory] Could not save parameters");
                false
            }
        }
    }

    /// Load from any reader with a named format.
    pub fn load_from_reader(
        &self,
        input: &mut dyn BufRead,
        format: &str,
        keep_old: bool,
    ) -> Result<(), LoadSaveError> {
        let resolved = self
            .shared
            .formats
            .format(format)
            .ok_or_else(|| LoadSaveError::UnknownFormat {
                filename: format!("<reader as {format}>"),
            })?;
        let _guard = self.lock();
        if !keep_old {
            self.clear_all();
        }
        let mut target = self.clone();
        resolved.handler.load(input, &mut target)
    }

    /// Save to any writer with a named format.
    pub fn save_to_writer(&self, output: &mut dyn Write, format: &str) -> Result<(), LoadSaveError> {
        let resolved = self
            .shared
            .formats
            .format(format)
            .ok_or_else(|| LoadSaveError::UnknownFormat {
                filename: format!("<writer as {format}>"),
            })?;
        resolved.handler.save(output, self)
    }
}
