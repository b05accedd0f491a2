use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes a finished WAV buffer to `path`.
///
/// The bytes go to a temporary file in the destination directory which is
/// then renamed over `path`, so a failure at any point leaves either the old
/// file or nothing, never a partial one. `path` may be the file the buffer
/// was read from.
///
/// # Arguments
/// * `path` - Output file path
/// * `bytes` - Complete RIFF/WAVE file contents
pub fn save_wav_bytes(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        save_wav_bytes(&path, b"first").unwrap();
        save_wav_bytes(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(save_wav_bytes(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
