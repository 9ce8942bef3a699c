//! String-or-file resolution for configuration values.
//!
//! Several settings (changelog, release channel, relations, manifest, metadata)
//! accept either inline text or a path to a file holding that text. The
//! filesystem is reached through [`FileSystem`] so callers can substitute it.
//! File contents are taken as raw bytes; encoding is never checked here.

use mockall::automock;
use std::io;
use std::path::Path;

/// Inputs longer than this are never treated as paths.
pub const MAX_PATH_LEN: usize = 255;

/// The filesystem queries the resolver needs.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait FileSystem {
    /// `Ok(false)` only when nothing exists at `path`; any other stat failure is an error.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match std::fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Returns the bytes of `input` itself, or the exact contents of the file it names.
pub fn read_bytes_or_file<F>(fs: &F, input: &str) -> io::Result<Vec<u8>>
where
    F: FileSystem + ?Sized,
{
    if input.is_empty() || input.len() > MAX_PATH_LEN {
        return Ok(input.as_bytes().to_vec());
    }

    let path = Path::new(input);
    if !fs.exists(path)? {
        return Ok(input.as_bytes().to_vec());
    }

    tracing::debug!(path = %path.display(), "Reading value from file");
    fs.read(path)
}

/// Like [`read_bytes_or_file`], decoding the result as text. Invalid UTF-8
/// sequences become U+FFFD rather than failing.
pub fn read_string_or_file<F>(fs: &F, input: &str) -> io::Result<String>
where
    F: FileSystem + ?Sized,
{
    let bytes = read_bytes_or_file(fs, input)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(input = %input, "File is not valid UTF-8, replacing invalid sequences");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}
