//! # File Formats
//!
//! Named loader/saver plug-ins, each with an optional default filename
//! extension used to guess the format of a file.

use crate::domain::registry::TypeRegistry;
use crate::ports::outbound::ParametersLoaderSaver;
use cf_01_config_tree::{ConfigTree, ParameterStore};
use parking_lot::RwLock;
use shared_types::LoadSaveError;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A registered format.
#[derive(Clone)]
pub struct FileFormat {
    pub name: String,
    pub default_extension: Option<String>,
    pub handler: Arc<dyn ParametersLoaderSaver>,
}

#[derive(Default)]
struct FormatsInner {
    formats: BTreeMap<String, FileFormat>,
    by_extension: HashMap<String, String>,
}

/// Registry of file formats.
#[derive(Default)]
pub struct FileFormats {
    inner: RwLock<FormatsInner>,
}

impl FileFormats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format. Returns false if the name or the extension is
    /// already taken.
    pub fn register_format(
        &self,
        name: &str,
        handler: Arc<dyn ParametersLoaderSaver>,
        default_extension: Option<&str>,
    ) -> bool {
        let mut inner = self.inner.write();
        if inner.formats.contains_key(name) {
            warn!(format = %name, "[Formats] Format already registered");
            return false;
        }
        let extension = default_extension.map(|e| e.trim_start_matches('.').to_string());
        if let Some(ext) = &extension {
            if inner.by_extension.contains_key(ext) {
                warn!(format = %name, extension = %ext, "[Formats] Extension already registered");
                return false;
            }
            inner.by_extension.insert(ext.clone(), name.to_string());
        }
        inner.formats.insert(
            name.to_string(),
            FileFormat {
                name: name.to_string(),
                default_extension: extension,
                handler,
            },
        );
        info!(format = %name, "[Formats] Format registered");
        true
    }

    pub fn is_format_registered(&self, name: &str) -> bool {
        self.inner.read().formats.contains_key(name)
    }

    pub fn format(&self, name: &str) -> Option<FileFormat> {
        self.inner.read().formats.get(name).cloned()
    }

    pub fn format_names(&self) -> Vec<String> {
        self.inner.read().formats.keys().cloned().collect()
    }

    /// Format whose default extension matches the file's extension.
    pub fn format_from_filename(&self, filename: &Path) -> Option<String> {
        let ext = filename.extension()?.to_str()?;
        self.inner.read().by_extension.get(ext).cloned()
    }

    /// The format named `format`, or the one guessed from the filename
    /// when `format` is empty or absent.
    pub fn resolve(&self, filename: &Path, format: Option<&str>) -> Result<FileFormat, LoadSaveError> {
        let unknown = || LoadSaveError::UnknownFormat {
            filename: filename.display().to_string(),
        };
        let name = match format.filter(|f| !f.is_empty()) {
            Some(name) => name.to_string(),
            None => self.format_from_filename(filename).ok_or_else(unknown)?,
        };
        self.format(&name).ok_or_else(unknown)
    }

    /// Load a file into `store`.
    pub fn load_file(
        &self,
        filename: &Path,
        format: Option<&str>,
        store: &mut dyn ParameterStore,
    ) -> Result<(), LoadSaveError> {
        let format = self.resolve(filename, format)?;
        let mut reader = BufReader::new(File::open(filename)?);
        format.handler.load(&mut reader, store)?;
        debug!(file = %filename.display(), format = %format.name, "[Formats] Parameters loaded");
        Ok(())
    }

    /// Save `store` to a file, replacing it.
    pub fn save_file(
        &self,
        filename: &Path,
        format: Option<&str>,
        store: &dyn ParameterStore,
    ) -> Result<(), LoadSaveError> {
        let format = self.resolve(filename, format)?;
        let mut writer = BufWriter::new(File::create(filename)?);
        format.handler.save(&mut writer, store)?;
        writer.flush()?;
        debug!(file = %filename.display(), format = %format.name, "[Formats] Parameters saved");
        Ok(())
    }
}

impl TypeRegistry {
    /// Save every type description to a file. Returns false on failure,
    /// after logging it.
    pub fn dump_type_descriptions(
        &self,
        formats: &FileFormats,
        filename: impl AsRef<Path>,
        format: Option<&str>,
    ) -> bool {
        let filename = filename.as_ref();
        let descriptions: ConfigTree<()> = self.type_description_tree();
        match formats.save_file(filename, format, &descriptions) {
            Ok(()) => true,
            Err(e) => {
                warn!(file = %filename.display(), error = %e, "[Registry] Could not dump type descriptions");
                false
            }
        }
    }
}
