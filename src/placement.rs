/// Collision-free placement of the original video file
use crate::error::{Result, ScrapeError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Highest disc index probed before giving up
pub const MAX_DISC_INDEX: u32 = 99;

/// Destination filename for disc `index` of `identifier`.
///
/// Disc 1 is `<identifier><ext>`, later discs are `<identifier>-cd<index><ext>`.
pub fn disc_filename(identifier: &str, index: u32, extension: &str) -> String {
    let ext = if extension.is_empty() {
        String::new()
    } else {
        format!(".{}", extension)
    };

    if index == 1 {
        format!("{}{}", identifier, ext)
    } else {
        format!("{}-cd{}{}", identifier, index, ext)
    }
}

/// First free destination path at or above `start_index`
pub async fn free_destination(
    source: &Path,
    dest_dir: &Path,
    identifier: &str,
    start_index: u32,
) -> Result<PathBuf> {
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    for index in start_index.max(1)..=MAX_DISC_INDEX {
        let candidate = dest_dir.join(disc_filename(identifier, index, extension));
        if fs::try_exists(&candidate).await? {
            debug!("Destination taken, probing next disc index: {}", candidate.display());
            continue;
        }
        return Ok(candidate);
    }

    Err(ScrapeError::PlacementExhausted {
        identifier: identifier.to_string(),
        dir: dest_dir.to_path_buf(),
    })
}

/// Move `source` into `dest_dir` under `identifier`, never overwriting an
/// existing file. Returns the final path.
pub async fn place_file(
    source: &Path,
    dest_dir: &Path,
    identifier: &str,
    start_index: u32,
) -> Result<PathBuf> {
    if !fs::try_exists(source).await? {
        return Err(ScrapeError::SourceMissing(source.to_path_buf()));
    }

    let destination = free_destination(source, dest_dir, identifier, start_index).await?;

    if let Err(rename_err) = fs::rename(source, &destination).await {
        // rename cannot cross filesystems; copy then remove instead
        debug!("Rename failed ({}), copying instead", rename_err);
        fs::copy(source, &destination).await.map_err(|_| rename_err)?;
        fs::remove_file(source).await?;
    }

    info!("📦 Moved {} -> {}", source.display(), destination.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_disc_filename() {
        assert_eq!(disc_filename("ABC-123", 1, "mp4"), "ABC-123.mp4");
        assert_eq!(disc_filename("ABC-123", 3, "mkv"), "ABC-123-cd3.mkv");
        assert_eq!(disc_filename("ABC-123", 1, ""), "ABC-123");
    }

    #[tokio::test]
    async fn test_place_into_empty_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("abc-123.mp4");
        fs::write(&source, b"video").await.unwrap();

        let placed = place_file(&source, output.path(), "ABC-123", 1).await.unwrap();

        assert_eq!(placed, output.path().join("ABC-123.mp4"));
        assert!(!source.exists());
        assert_eq!(fs::read(&placed).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_existing_file_is_never_overwritten() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let source = input.path().join("NUM.mp4");
        fs::write(&source, b"new").await.unwrap();
        fs::write(output.path().join("NUM.mp4"), b"old").await.unwrap();

        let placed = place_file(&source, output.path(), "NUM", 1).await.unwrap();

        assert_eq!(placed, output.path().join("NUM-cd2.mp4"));
        assert_eq!(fs::read(output.path().join("NUM.mp4")).await.unwrap(), b"old");
        assert_eq!(fs::read(&placed).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_probing_skips_every_taken_index() {
        let output = TempDir::new().unwrap();
        let source = output.path().join("source.avi");
        fs::write(&source, b"x").await.unwrap();
        fs::write(output.path().join("NUM-cd2.avi"), b"").await.unwrap();
        fs::write(output.path().join("NUM-cd3.avi"), b"").await.unwrap();

        let placed = place_file(&source, output.path(), "NUM", 2).await.unwrap();
        assert_eq!(placed, output.path().join("NUM-cd4.avi"));
    }

    #[tokio::test]
    async fn test_missing_source() {
        let output = TempDir::new().unwrap();
        let source = output.path().join("gone.mp4");

        let err = place_file(&source, output.path(), "NUM", 1).await.unwrap_err();
        assert!(matches!(err, ScrapeError::SourceMissing(_)));
    }

    #[tokio::test]
    async fn test_probing_is_capped() {
        let output = TempDir::new().unwrap();
        let source = output.path().join("source.mp4");
        fs::write(&source, b"x").await.unwrap();
        fs::write(output.path().join("NUM-cd99.mp4"), b"").await.unwrap();

        let err = free_destination(&source, output.path(), "NUM", MAX_DISC_INDEX)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::PlacementExhausted { .. }));
    }
}
