//! Artifact sinks.
//!
//! A sink hands out one writer per target. Content becomes visible only when
//! the writer is finished; a writer dropped early leaves nothing behind.

use crate::error::SinkError;
use crate::guards::path_safety::{check_target, resolve_source_path};
use crate::model::{GeneratedArtifact, qualify};
use indexmap::IndexMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Streaming writer for one artifact.
pub trait ArtifactWriter: Write {
    /// Commits the written content to the target.
    fn finish(self: Box<Self>) -> Result<(), SinkError>;
}

/// Destination for generated compilation units, keyed by `(package, name)`.
pub trait ArtifactSink {
    fn open(&mut self, package: &str, name: &str)
    -> Result<Box<dyn ArtifactWriter + '_>, SinkError>;
}

/// Writes a complete artifact through `sink`.
pub fn write_artifact(
    sink: &mut dyn ArtifactSink,
    artifact: &GeneratedArtifact,
) -> Result<(), SinkError> {
    let target = artifact.qualified_name();
    let mut writer = sink.open(&artifact.target_package, &artifact.target_name)?;
    writer
        .write_all(artifact.body.as_bytes())
        .map_err(|source| SinkError::Io {
            target: target.clone(),
            source,
        })?;
    writer.finish()
}

// =============================================================================
// File system
// =============================================================================

/// Writes `<root>/<package path>/<Name>.java`, atomically per file.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
    overwrite: bool,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite: true,
        }
    }

    /// Refuse to replace files already present under the root.
    pub fn reject_existing(mut self) -> Self {
        self.overwrite = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for FsSink {
    fn open(
        &mut self,
        package: &str,
        name: &str,
    ) -> Result<Box<dyn ArtifactWriter + '_>, SinkError> {
        let target = qualify(package, name);
        let path = resolve_source_path(&self.root, package, name)?;
        if !self.overwrite && path.exists() {
            return Err(SinkError::AlreadyExists { target });
        }

        let io_err = |source: io::Error| SinkError::Io {
            target: target.clone(),
            source,
        };
        let parent = path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(io_err)?;
        let temp = NamedTempFile::new_in(parent).map_err(io_err)?;

        tracing::debug!(artifact = %target, path = %path.display(), "opened artifact");
        Ok(Box::new(FsWriter { temp, path, target }))
    }
}

struct FsWriter {
    temp: NamedTempFile,
    path: PathBuf,
    target: String,
}

impl Write for FsWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

impl ArtifactWriter for FsWriter {
    fn finish(self: Box<Self>) -> Result<(), SinkError> {
        let FsWriter {
            mut temp,
            path,
            target,
        } = *self;
        temp.flush().map_err(|source| SinkError::Io {
            target: target.clone(),
            source,
        })?;
        temp.persist(&path).map_err(|err| SinkError::Io {
            target,
            source: err.error,
        })?;
        Ok(())
    }
}

// =============================================================================
// In memory
// =============================================================================

/// Keeps artifacts in memory, in the order they were finished.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: IndexMap<String, String>,
    reject_existing: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to replace an artifact already held by the sink.
    pub fn reject_existing(mut self) -> Self {
        self.reject_existing = true;
        self
    }

    /// Seeds the sink as if `qualified_name` had been written before.
    pub fn preload(&mut self, qualified_name: impl Into<String>, body: impl Into<String>) {
        self.artifacts.insert(qualified_name.into(), body.into());
    }

    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.artifacts.get(qualified_name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn open(
        &mut self,
        package: &str,
        name: &str,
    ) -> Result<Box<dyn ArtifactWriter + '_>, SinkError> {
        check_target(package, name)?;
        let target = qualify(package, name);
        if self.reject_existing && self.artifacts.contains_key(&target) {
            return Err(SinkError::AlreadyExists { target });
        }
        Ok(Box::new(MemoryWriter {
            artifacts: &mut self.artifacts,
            target,
            buffer: Vec::new(),
        }))
    }
}

struct MemoryWriter<'a> {
    artifacts: &'a mut IndexMap<String, String>,
    target: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ArtifactWriter for MemoryWriter<'_> {
    fn finish(self: Box<Self>) -> Result<(), SinkError> {
        let MemoryWriter {
            artifacts,
            target,
            buffer,
        } = *self;
        let body = String::from_utf8(buffer).map_err(|err| SinkError::Io {
            target: target.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;
        artifacts.insert(target, body);
        Ok(())
    }
}
