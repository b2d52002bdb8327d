// SPDX-FileCopyrightText: 2026 Procflow contributors
// SPDX-License-Identifier: LicenseRef-Procflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Procflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::{Arrow, Entity, EntityStore};
use crate::ops::{self, ApplyError, Op};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unsupported document version {version} at {path:?} (expected {})", DOCUMENT_VERSION)]
    UnsupportedVersion { path: PathBuf, version: u32 },
    #[error("inconsistent document at {path:?}: {source}")]
    Invalid { path: PathBuf, source: ApplyError },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Temp file plus atomic rename, without fsync.
    #[default]
    BestEffort,
    /// Also syncs the file and (on unix) its directory.
    Durable,
}

/// On-disk shape: entities in document order (parents before children), then arrows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: u32,
    pub entities: Vec<Entity>,
    pub arrows: Vec<Arrow>,
}

impl DocumentFile {
    pub fn from_store(store: &EntityStore) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            entities: store.entities_in_order().into_iter().cloned().collect(),
            arrows: store.arrows().cloned().collect(),
        }
    }

    /// Rebuilds a store through the same validated ops the engine uses, so a hand-edited file
    /// cannot smuggle in a broken hierarchy.
    pub fn into_store(self) -> Result<EntityStore, ApplyError> {
        let mut store = EntityStore::new();
        let entity_ops = self
            .entities
            .into_iter()
            .map(|entity| Op::InsertEntity {
                entity,
                index: None,
            });
        let arrow_ops = self
            .arrows
            .into_iter()
            .map(|arrow| Op::InsertArrow { arrow, index: None });
        ops::apply_ops(&mut store, entity_ops.chain(arrow_ops))?;
        Ok(store)
    }
}

/// A JSON document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    path: PathBuf,
    durability: WriteDurability,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name for window titles: the file name without its directory.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn load(&self) -> Result<EntityStore, StoreError> {
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: DocumentFile =
            serde_json::from_str(&text).map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })?;
        if document.version != DOCUMENT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                version: document.version,
            });
        }
        let store = document.into_store().map_err(|source| StoreError::Invalid {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            "loaded {:?}: {} entities, {} arrows",
            self.path,
            store.entity_count(),
            store.arrow_count()
        );
        Ok(store)
    }

    pub fn save(&self, store: &EntityStore) -> Result<(), StoreError> {
        let document = DocumentFile::from_store(store);
        let text = serde_json::to_string_pretty(&document).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, format!("{text}\n").as_bytes(), self.durability)?;
        debug!("saved {:?}", self.path);
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    fs::create_dir_all(parent).map_err(|source| StoreError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".procflow.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    let written = file.write_all(contents).and_then(|()| {
        if durability == WriteDurability::Durable {
            file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: tmp_path,
            source,
        });
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}
