use crate::{
    core::{Candidate, NameserverSource},
    resolv_conf::parse_nameservers,
    sources::SourceError,
};
use async_trait::async_trait;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

/// Reads `nameserver` lines from the local resolver configuration file.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file synchronously.
    pub fn read(&self) -> Result<Vec<Candidate>, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::ConfigUnreadable {
            path: self.path.clone(),
            source,
        })?;
        parse_nameservers(BufReader::new(file)).map_err(|source| SourceError::ConfigScanError {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl NameserverSource for LocalFileSource {
    fn name(&self) -> &str {
        "resolv_conf"
    }

    async fn fetch(&mut self) -> Result<Vec<Candidate>, SourceError> {
        let source = self.clone();
        match tokio::task::spawn_blocking(move || source.read()).await {
            Ok(result) => result,
            Err(e) => Err(SourceError::ConfigScanError {
                path: self.path.clone(),
                source: std::io::Error::other(e.to_string()),
            }),
        }
    }
}
