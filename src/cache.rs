//! Snapshot caching of indexed documentation sites.
//!
//! A snapshot is keyed by a digest of every navigation script (relative path
//! and contents), so any regenerated page produces a new key. Snapshots are
//! postcard-encoded and live in a per-user cache directory.

use crate::error::Result;
use crate::site::{self, DocSite, ScriptFile};
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xxhash_rust::xxh3::Xxh3;

/// Bumped whenever the snapshot layout changes.
const SNAPSHOT_FORMAT: u32 = 1;

/// 64-bit xxh3 digest of a documentation tree's navigation scripts.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Digest(pub u64);

impl Digest {
    /// Hashes `(relative path, contents)` pairs in the order given.
    ///
    /// [`site::discover`] already returns scripts sorted by path, which keeps the
    /// digest independent of directory iteration order.
    pub fn of_sources(sources: &[(ScriptFile, String)]) -> Self {
        let mut hasher = Xxh3::new();
        for (file, source) in sources {
            let path = file.relative.to_string_lossy();
            hasher.update(&(path.len() as u64).to_le_bytes());
            hasher.update(path.as_bytes());
            hasher.update(&(source.len() as u64).to_le_bytes());
            hasher.update(source.as_bytes());
        }
        Self(hasher.digest())
    }

    /// Returns the digest as a lowercase hexadecimal string
    pub fn as_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseDigestError::InvalidLength(s.len()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseDigestError::InvalidHex)
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for digest parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    /// Invalid hexadecimal characters in the input
    #[error("invalid hexadecimal characters in digest string")]
    InvalidHex,
    /// Invalid length (expected 16 hex characters)
    #[error("invalid digest length: expected 16 hex characters, got {0}")]
    InvalidLength(usize),
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    format: u32,
    digest: Digest,
    site: DocSite,
}

/// Location of the snapshot for a given digest.
pub fn snapshot_path(cache_dir: &Path, digest: Digest) -> PathBuf {
    cache_dir.join(format!("{}.snapshot", digest))
}

/// Loads the site index from the snapshot cache, scanning on a miss.
///
/// Corrupt or outdated snapshots are logged and replaced; cache write
/// failures never fail the load.
pub async fn load_or_scan(doc_dir: &Path, cache_dir: &Path) -> Result<DocSite> {
    let sources = site::read_sources(doc_dir).await?;
    let digest = Digest::of_sources(&sources);
    let path = snapshot_path(cache_dir, digest);

    if let Some(mut site) = load_snapshot(&path, digest).await {
        tracing::info!(digest = %digest, path = %path.display(), "Loaded documentation index from cache");
        site.set_root(doc_dir);
        return Ok(site);
    }

    tracing::info!(digest = %digest, "Cache miss, indexing documentation");
    let site = DocSite::from_sources(doc_dir, &sources);
    if let Err(e) = store_snapshot(&path, digest, &site).await {
        tracing::warn!("Failed to cache documentation index at {}: {:#}", path.display(), e);
    }
    Ok(site)
}

async fn load_snapshot(path: &Path, digest: Digest) -> Option<DocSite> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("Failed to read snapshot at {}: {}", path.display(), e);
            return None;
        }
    };
    let path = path.to_path_buf();

    // Deserialize in spawn_blocking since it's CPU intensive
    tokio::task::spawn_blocking(move || match postcard::from_bytes::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.format == SNAPSHOT_FORMAT && snapshot.digest == digest => {
            Some(snapshot.site)
        }
        Ok(_) => {
            tracing::info!("Snapshot outdated, will rebuild (file: {})", path.display());
            let _ = std::fs::remove_file(&path);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to deserialize snapshot at {}: {}", path.display(), e);
            let _ = std::fs::remove_file(&path);
            None
        }
    })
    .await
    .ok()?
}

async fn store_snapshot(path: &Path, digest: Digest, site: &DocSite) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let snapshot = Snapshot {
        format: SNAPSHOT_FORMAT,
        digest,
        site: site.clone(),
    };
    let path = path.to_path_buf();

    // Serialize in spawn_blocking since it's CPU intensive
    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        if let Err(e) = postcard::to_io(&snapshot, file) {
            let _ = std::fs::remove_file(&path);
            return Err(e).context("Failed to serialize snapshot");
        }
        tracing::debug!("Cached documentation index to {}", path.display());
        Ok(())
    })
    .await
    .context("Snapshot storing task panicked")?
}
