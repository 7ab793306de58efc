//! Encounter library.
//!
//! Loads authored encounter files, validates each graph and stamps it with a
//! SHA-256 hash of its source so content revisions can be told apart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encounter_core::error::EncounterError;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::domain::graph::EncounterGraph;

/// Errors raised while loading encounter content.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A document could not be parsed.
    #[error("failed to parse {origin}: {message}")]
    Parse {
        /// File path or other label of the document.
        origin: String,
        /// Parser message.
        message: String,
    },

    /// A parsed graph failed validation.
    #[error("invalid encounter in {origin}: {source}")]
    Invalid {
        /// File path or other label of the document.
        origin: String,
        /// The validation error.
        source: EncounterError,
    },

    /// Two documents declare the same encounter id.
    #[error("duplicate encounter id: {0}")]
    DuplicateEncounter(String),
}

/// Source format of an encounter document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Picks the format from a file extension; `None` for anything else.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// One loaded encounter.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// The validated graph.
    pub graph: Arc<EncounterGraph>,
    /// Lowercase hex SHA-256 of the source document.
    pub source_hash: String,
}

/// An ordered collection of validated encounters keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EncounterLibrary {
    entries: Vec<LibraryEntry>,
    by_id: HashMap<String, usize>,
}

/// Returns the lowercase hex SHA-256 of `source`.
#[must_use]
pub fn source_hash(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Parses and validates a single encounter document.
///
/// # Errors
///
/// Returns `LoadError::Parse` for syntax or shape errors and
/// `LoadError::Invalid` when the graph fails validation.
pub fn parse_encounter(
    source: &str,
    format: SourceFormat,
    origin: &str,
) -> Result<EncounterGraph, LoadError> {
    let document: crate::domain::graph::EncounterGraphDocument = match format {
        SourceFormat::Yaml => serde_yaml::from_str(source).map_err(|e| LoadError::Parse {
            origin: origin.to_owned(),
            message: e.to_string(),
        })?,
        SourceFormat::Json => serde_json::from_str(source).map_err(|e| LoadError::Parse {
            origin: origin.to_owned(),
            message: e.to_string(),
        })?,
    };
    EncounterGraph::try_from(document).map_err(|source| LoadError::Invalid {
        origin: origin.to_owned(),
        source,
    })
}

impl EncounterLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.yaml`, `*.yml` and `*.json` file in `dir`, in file name
    /// order. Other files are skipped; subdirectories are not descended.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the directory or a file cannot be read, a
    /// document is invalid, or two documents share an encounter id.
    pub fn load_dir(dir: &Path) -> Result<Self, LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && SourceFormat::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut library = Self::new();
        for path in paths {
            library.load_file(&path)?;
        }
        info!(dir = %dir.display(), encounters = library.len(), "encounter library loaded");
        Ok(library)
    }

    /// Loads one file, choosing the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the file cannot be read or parsed, or its
    /// encounter id is already present.
    pub fn load_file(&mut self, path: &Path) -> Result<&LibraryEntry, LoadError> {
        let format = SourceFormat::from_path(path).ok_or_else(|| LoadError::Parse {
            origin: path.display().to_string(),
            message: "unsupported file extension".to_owned(),
        })?;
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.insert_source(&source, format, &path.display().to_string())
    }

    /// Parses a document from memory and adds it.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the document is invalid or its encounter id is
    /// already present.
    pub fn insert_source(
        &mut self,
        source: &str,
        format: SourceFormat,
        origin: &str,
    ) -> Result<&LibraryEntry, LoadError> {
        let graph = parse_encounter(source, format, origin)?;
        self.insert(graph, source_hash(source))
    }

    /// Adds an already-built graph.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::DuplicateEncounter` if the id is already present.
    pub fn insert(
        &mut self,
        graph: EncounterGraph,
        source_hash: String,
    ) -> Result<&LibraryEntry, LoadError> {
        let id = graph.id().to_owned();
        if self.by_id.contains_key(&id) {
            return Err(LoadError::DuplicateEncounter(id));
        }
        for orphan in graph.unreachable_nodes() {
            debug!(encounter_id = %id, node_id = %orphan, "node unreachable from beginning");
        }
        let position = self.entries.len();
        self.entries.push(LibraryEntry {
            graph: Arc::new(graph),
            source_hash,
        });
        self.by_id.insert(id, position);
        Ok(&self.entries[position])
    }

    /// Looks up an encounter by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LibraryEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    /// Iterates encounters in load order.
    pub fn iter(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.iter()
    }

    /// Returns the number of encounters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no encounters are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
