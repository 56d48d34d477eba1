//! Build artifact map.
//!
//! A [`Bundle`] maps output-relative paths (`assets/style.css`, `main.js`) to
//! the artifacts a build produced. Chunks carry generated code as text, assets
//! carry raw bytes. The integrity annotator only ever reads from it.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::WalkDir;
use rustc_hash::FxHashMap;

/// Extensions of files loaded as code chunks by [`Bundle::from_dir`].
const CHUNK_EXTENSIONS: [&str; 3] = ["js", "mjs", "cjs"];

/// A single build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Generated script with textual code.
    Chunk { code: String },
    /// Emitted file with raw source bytes.
    Asset { source: Vec<u8> },
}

impl Artifact {
    pub fn chunk(code: impl Into<String>) -> Self {
        Self::Chunk { code: code.into() }
    }

    pub fn asset(source: impl Into<Vec<u8>>) -> Self {
        Self::Asset {
            source: source.into(),
        }
    }

    /// Bytes to hash: the code of a chunk, else the source of an asset.
    #[inline]
    pub fn content(&self) -> &[u8] {
        match self {
            Self::Chunk { code } => code.as_bytes(),
            Self::Asset { source } => source,
        }
    }
}

/// Output-relative path → artifact.
#[derive(Debug, Clone, Default)]
pub struct Bundle {
    artifacts: FxHashMap<String, Artifact>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact, returning the one previously stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, artifact: Artifact) -> Option<Artifact> {
        self.artifacts.insert(key.into(), artifact)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Artifact> {
        self.artifacts.get(key)
    }

    /// Look up `key`, returning the stored key alongside the artifact.
    #[inline]
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &Artifact)> {
        self.artifacts
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.artifacts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.artifacts.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Load every file under `dir` as an artifact.
    ///
    /// Keys are `/`-separated paths relative to `dir`. Script files that are
    /// valid UTF-8 become chunks, everything else is an asset. A missing
    /// `dir` or any entry that cannot be walked or read is an error.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("`{}` is not a directory", dir.display()),
            ));
        }

        let mut bundle = Self::new();
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rel) = path.strip_prefix(dir) else {
                continue;
            };
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let bytes = fs::read(&path)?;
            bundle.insert(key, classify(&path, bytes));
        }

        Ok(bundle)
    }
}

/// Decide whether file contents are a chunk or an asset.
fn classify(path: &Path, bytes: Vec<u8>) -> Artifact {
    let is_script = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CHUNK_EXTENSIONS.contains(&ext));

    if !is_script {
        return Artifact::Asset { source: bytes };
    }
    match String::from_utf8(bytes) {
        Ok(code) => Artifact::Chunk { code },
        Err(err) => Artifact::Asset {
            source: err.into_bytes(),
        },
    }
}

impl<K: Into<String>> FromIterator<(K, Artifact)> for Bundle {
    fn from_iter<I: IntoIterator<Item = (K, Artifact)>>(iter: I) -> Self {
        Self {
            artifacts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
