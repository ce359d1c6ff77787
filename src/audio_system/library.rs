/// Asset library
///
/// Preloads every configured sound into memory once at startup. The library
/// is read-only afterwards: playback only instantiates copies from it.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::LibraryConfig;
use crate::error::{LibraryBuildError, SoundError};

/// Reads asset bytes from wherever the library lives.
pub trait AssetLoader {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Loads assets straight from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl AssetLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// One encoded file of a sound
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub file_type: String,
    pub path: PathBuf,
    pub data: Arc<Vec<u8>>,
}

/// A preloaded sound, with one file per allowed file type
#[derive(Debug)]
pub struct SoundAsset {
    name: String,
    files: Vec<AssetFile>,
}

impl SoundAsset {
    /// Assemble an asset from already-loaded files
    pub fn from_files(name: impl Into<String>, files: Vec<AssetFile>) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Files in file-type preference order
    pub fn files(&self) -> &[AssetFile] {
        &self.files
    }
}

/// Immutable name → asset mapping
#[derive(Debug)]
pub struct AssetLibrary {
    config: LibraryConfig,
    assets: HashMap<String, Arc<SoundAsset>>,
}

impl AssetLibrary {
    /// Build the library, loading `directory/path/name.file_type` for every
    /// configured name and every allowed file type.
    pub fn build(
        config: LibraryConfig,
        loader: &dyn AssetLoader,
    ) -> Result<Self, LibraryBuildError> {
        if config.file_types.is_empty() {
            return Err(LibraryBuildError::NoFileTypes);
        }

        let mut assets: HashMap<String, Arc<SoundAsset>> = HashMap::new();
        let mut origins: HashMap<&str, &str> = HashMap::new();
        let mut total_bytes = 0usize;

        for (sub_path, names) in &config.library {
            for name in names {
                if let Some(first) = origins.insert(name.as_str(), sub_path.as_str()) {
                    return Err(LibraryBuildError::DuplicateName {
                        name: name.clone(),
                        first: first.to_string(),
                        second: sub_path.clone(),
                    });
                }

                let mut files = Vec::with_capacity(config.file_types.len());
                for file_type in &config.file_types {
                    let path = config
                        .directory
                        .join(sub_path)
                        .join(format!("{}.{}", name, file_type));
                    let data = loader.load(&path).map_err(|source| {
                        LibraryBuildError::MissingAsset {
                            name: name.clone(),
                            file_type: file_type.clone(),
                            path: path.display().to_string(),
                            source,
                        }
                    })?;
                    total_bytes += data.len();
                    files.push(AssetFile {
                        file_type: file_type.clone(),
                        path,
                        data: Arc::new(data),
                    });
                }

                assets.insert(
                    name.clone(),
                    Arc::new(SoundAsset {
                        name: name.clone(),
                        files,
                    }),
                );
            }
        }

        tracing::info!(
            "Built sound library from {}: {} sounds ({} bytes)",
            config.directory.display(),
            assets.len(),
            total_bytes
        );

        Ok(Self { config, assets })
    }

    /// Look up a sound by its logical name
    pub fn resolve(&self, name: &str) -> Result<&Arc<SoundAsset>, SoundError> {
        self.assets
            .get(name)
            .ok_or_else(|| SoundError::UnknownSound(name.to_string()))
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn file_types(&self) -> &[String] {
        &self.config.file_types
    }

    /// The configured sub-directory → names mapping
    pub fn library(&self) -> &BTreeMap<String, Vec<String>> {
        &self.config.library
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
