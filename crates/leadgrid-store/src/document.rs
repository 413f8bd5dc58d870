//! Reading and atomically replacing list documents on disk.

use crate::error::{Result, StoreError};
use crate::schema::{ListDocument, SearchLogEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Read and decode a list document.
///
/// A missing file maps to `StoreError::NotFound` named after `list`.
pub(crate) async fn read_document(path: &Path, list: &str) -> Result<ListDocument> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StoreError::NotFound {
                list: list.to_string(),
            })
        }
        Err(e) => return Err(StoreError::Io(e)),
    };

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Read only the auxiliary search log.
///
/// Returns `None` when the document carries no log.
pub(crate) async fn read_search_log(
    path: &Path,
    list: &str,
) -> Result<Option<Vec<SearchLogEntry>>> {
    Ok(read_document(path, list).await?.searches)
}

/// Replace `path` with `document`.
///
/// The content is written and fsynced to a temp file in the same directory,
/// then renamed over the target. Readers see either the old or the new
/// document, never a partial one; on failure the old document is untouched
/// and the temp file is removed.
pub(crate) async fn write_atomic(path: &Path, document: &ListDocument) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(document)?;
    let tmp = temp_path(path);

    if let Err(source) = write_and_swap(&tmp, path, &bytes).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != ErrorKind::NotFound {
                tracing::warn!(tmp = %tmp.display(), "failed to remove temp file: {cleanup}");
            }
        }
        return Err(StoreError::Persistence {
            path: path.to_path_buf(),
            source,
        });
    }

    // The swap has happened; a failed directory sync only weakens durability.
    if let Err(e) = sync_parent_dir(path).await {
        tracing::warn!(path = %path.display(), "failed to sync list directory: {e}");
    }

    tracing::trace!(path = %path.display(), bytes = bytes.len(), "list document replaced");
    Ok(())
}

async fn write_and_swap(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

/// Flush the directory entry of `path` so a completed rename survives a crash.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Hidden sibling path, e.g. `.leads.json.tmp-<uuid>`.
fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp-{}", Uuid::new_v4().simple()))
}
