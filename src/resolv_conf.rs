//! Reading and writing resolver configuration files.
//!
//! Only `nameserver` lines are ever read back. Writes always replace the
//! whole file with a freshly rendered document.

use crate::core::Candidate;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

const NAMESERVER_KEYWORD: &str = "nameserver";

/// Errors raised while replacing the resolver configuration file.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write resolver config {path}: {source}")]
    ConfigWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Extracts the address from every `nameserver` line of `reader`.
///
/// A line counts when, after trimming, its first whitespace-separated token
/// is exactly `nameserver`. Lines without an address are skipped.
pub fn parse_nameservers<R: BufRead>(reader: R) -> std::io::Result<Vec<Candidate>> {
    let mut nameservers = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        if fields.next() != Some(NAMESERVER_KEYWORD) {
            continue;
        }
        if let Some(addr) = fields.next() {
            nameservers.push(addr.to_string());
        }
    }
    Ok(nameservers)
}

/// Renders the resolver configuration document.
///
/// One `nameserver` line per selected candidate in order, then an `options`
/// line and a `search` line. Empty `options` or `search` suppress their line.
pub fn render(selection: &[Candidate], options: &str, search: &str) -> String {
    let mut doc = String::new();
    for ns in selection {
        doc.push_str(NAMESERVER_KEYWORD);
        doc.push(' ');
        doc.push_str(ns);
        doc.push('\n');
    }
    if !options.is_empty() {
        doc.push_str("options ");
        doc.push_str(options);
        doc.push('\n');
    }
    if !search.is_empty() {
        doc.push_str("search ");
        doc.push_str(search);
        doc.push('\n');
    }
    doc
}

/// Replaces the resolver configuration file with a rendered selection.
#[derive(Debug, Clone)]
pub struct ResolvConfWriter {
    path: PathBuf,
    options: String,
    search: String,
    atomic: bool,
}

impl ResolvConfWriter {
    /// Creates a writer for `path`.
    ///
    /// With `atomic` set, the document is written to a temporary file in the
    /// same directory and renamed over the target, so readers never observe
    /// a partial file. Without it, the target is truncated and rewritten in
    /// place, which also works when the target is a bind mount.
    pub fn new(
        path: impl Into<PathBuf>,
        options: impl Into<String>,
        search: impl Into<String>,
        atomic: bool,
    ) -> Self {
        Self {
            path: path.into(),
            options: options.into(),
            search: search.into(),
            atomic,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders `selection` and replaces the file with it.
    pub fn write(&self, selection: &[Candidate]) -> Result<(), WriteError> {
        let doc = render(selection, &self.options, &self.search);
        let result = if self.atomic {
            self.replace_atomically(doc.as_bytes())
        } else {
            self.overwrite_in_place(doc.as_bytes())
        };
        result.map_err(|source| WriteError::ConfigWriteError {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = doc.len(), "Resolver config written.");
        Ok(())
    }

    fn replace_atomically(&self, contents: &[u8]) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents)?;
        tmp.as_file().sync_all()?;
        // The temp file inherits 0600; resolver configs must stay world-readable.
        set_readable_permissions(tmp.as_file())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn overwrite_in_place(&self, contents: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(contents)?;
        file.sync_all()
    }
}

#[cfg(unix)]
fn set_readable_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}
