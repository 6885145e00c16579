//! Ledger persistence backends
//!
//! Every writable backend replaces its destination as a whole: content is
//! written to a temp file in the destination directory, synced, then renamed
//! over the old file.

pub mod csv_dir;
pub mod public_sheet;
pub mod snapshot;
pub mod workbook;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;

/// Where the ledger is loaded from and saved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerSource {
    /// One `.xlsx` file with Inflow, Outflow and Budget sheets
    Workbook(PathBuf),
    /// A directory holding `Inflow.csv`, `Outflow.csv` and `Budget.csv`
    CsvDirectory(PathBuf),
    /// A `.json` ledger snapshot
    Snapshot(PathBuf),
    /// Public CSV export URL; read-only
    PublicSheet(String),
}

impl LedgerSource {
    pub fn from_config(config: &LedgerConfig) -> LedgerResult<Self> {
        let path = config.path.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let url = config.sheet_url.as_deref().map(str::trim).filter(|u| !u.is_empty());

        match (path, url) {
            (Some(path), None) => Ok(Self::from_path(path)),
            (None, Some(url)) => Ok(Self::PublicSheet(url.to_string())),
            (Some(_), Some(_)) => Err(LedgerError::Configuration(
                "set only one of ledger.path and ledger.sheet_url".to_string(),
            )),
            (None, None) => Err(LedgerError::Configuration(
                "set ledger.path or ledger.sheet_url".to_string(),
            )),
        }
    }

    /// Pick a file backend from the path extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xlsx") => Self::Workbook(path),
            Some("json") => Self::Snapshot(path),
            _ => Self::CsvDirectory(path),
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::PublicSheet(_))
    }
}

impl fmt::Display for LedgerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(path) => write!(f, "workbook {}", path.display()),
            Self::CsvDirectory(path) => write!(f, "CSV directory {}", path.display()),
            Self::Snapshot(path) => write!(f, "snapshot {}", path.display()),
            Self::PublicSheet(url) => write!(f, "public sheet {}", url),
        }
    }
}

/// Load and integrity-check a ledger
pub async fn load_ledger(source: &LedgerSource) -> LedgerResult<Ledger> {
    let ledger = match source {
        LedgerSource::PublicSheet(url) => {
            let sheets = public_sheet::fetch_sheets(url).await?;
            Ledger::from_sheets(&sheets)?
        }
        LedgerSource::Workbook(path) => {
            let path = path.clone();
            blocking(move || Ok(Ledger::from_sheets(&workbook::read_path(&path)?)?)).await?
        }
        LedgerSource::CsvDirectory(path) => {
            let path = path.clone();
            blocking(move || Ok(Ledger::from_sheets(&csv_dir::read_dir(&path)?)?)).await?
        }
        LedgerSource::Snapshot(path) => {
            let path = path.clone();
            blocking(move || Ok(Ledger::from_snapshot(snapshot::read(&path)?)?)).await?
        }
    };

    tracing::info!(
        "Loaded ledger from {}: {} inflow, {} outflow, {} budget rows",
        source,
        ledger.inflow().len(),
        ledger.outflow().len(),
        ledger.budget().len()
    );
    Ok(ledger)
}

/// Replace the destination with the full contents of `ledger`
pub async fn save_ledger(destination: &LedgerSource, ledger: &Ledger) -> LedgerResult<()> {
    let snapshot = ledger.snapshot();
    let revision = snapshot.revision;

    match destination {
        LedgerSource::PublicSheet(url) => return Err(LedgerError::ReadOnlySource(url.clone())),
        LedgerSource::Workbook(path) => {
            let path = path.clone();
            blocking(move || {
                let bytes = workbook::to_bytes(&crate::ledger::schema::snapshot_to_sheets(&snapshot))?;
                write_atomic(&path, &bytes)
            })
            .await?
        }
        LedgerSource::CsvDirectory(path) => {
            let path = path.clone();
            blocking(move || {
                csv_dir::write_dir(&path, &crate::ledger::schema::snapshot_to_sheets(&snapshot))
            })
            .await?
        }
        LedgerSource::Snapshot(path) => {
            let path = path.clone();
            blocking(move || snapshot::write(&path, &snapshot)).await?
        }
    }

    tracing::info!("Saved ledger revision {} to {}", revision, destination);
    Ok(())
}

async fn blocking<T, F>(task: F) -> LedgerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> LedgerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| LedgerError::Internal(format!("storage task failed: {}", e)))?
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Write `bytes` to a synced temp file next to `path` without touching `path`
pub(crate) fn stage(path: &Path, bytes: &[u8]) -> LedgerResult<NamedTempFile> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(parent)?;
    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    Ok(file)
}

/// Rename a staged file over `path` and sync the directory entry
pub(crate) fn commit_staged(staged: NamedTempFile, path: &Path) -> LedgerResult<()> {
    staged.persist(path)?;
    sync_dir(parent_dir(path))
}

/// Flush a directory so a completed rename survives a crash
#[cfg(unix)]
fn sync_dir(dir: &Path) -> LedgerResult<()> {
    std::fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files on other platforms
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> LedgerResult<()> {
    Ok(())
}

pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> LedgerResult<()> {
    let staged = stage(path, bytes)?;
    commit_staged(staged, path)
}
