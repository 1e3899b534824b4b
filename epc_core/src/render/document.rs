//! Rendered output bound to its working directory.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::errors::{EpcError, EpcResult};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEX: &str = "application/x-tex";

/// An open render result. The working directory lives exactly as long as
/// the document: [`Document::close`] or drop removes it.
#[derive(Debug)]
pub struct Document {
    file: Option<File>,
    path: PathBuf,
    mime: &'static str,
    dir: Option<TempDir>,
}

impl Document {
    pub(crate) fn open(dir: TempDir, path: PathBuf, mime: &'static str) -> EpcResult<Self> {
        let file = File::open(&path)
            .map_err(|e| EpcError::file_error("open", path.display().to_string(), e.to_string()))?;
        Ok(Document {
            file: Some(file),
            path,
            mime,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Copy the document to `dest` and close it.
    pub fn persist(mut self, dest: &Path) -> EpcResult<u64> {
        let mut out = File::create(dest)
            .map_err(|e| EpcError::file_error("create", dest.display().to_string(), e.to_string()))?;
        let copied = io::copy(&mut self, &mut out)
            .map_err(|e| EpcError::file_error("write", dest.display().to_string(), e.to_string()))?;
        self.close()?;
        Ok(copied)
    }

    /// Close the file and remove the working directory. A directory that is
    /// already gone is not an error.
    pub fn close(mut self) -> EpcResult<()> {
        self.release()
    }

    fn release(&mut self) -> EpcResult<()> {
        self.file.take();
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EpcError::file_error(
                "remove",
                path.display().to_string(),
                e.to_string(),
            )),
        }
    }
}

impl Read for Document {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "render directory left behind");
        }
    }
}

/// Remove a render directory after a failed render.
pub(crate) fn discard(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove render directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn document(content: &str) -> (Document, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let path = root.join("out.pdf");
        fs::write(&path, content).unwrap();
        (Document::open(dir, path, MIME_PDF).unwrap(), root)
    }

    #[test]
    fn test_close_removes_directory() {
        let (mut doc, root) = document("%PDF-1.7");
        let mut text = String::new();
        doc.read_to_string(&mut text).unwrap();
        assert_eq!(text, "%PDF-1.7");
        assert_eq!(doc.mime(), MIME_PDF);
        doc.close().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let (doc, root) = document("x");
        drop(doc);
        assert!(!root.exists());
    }

    #[test]
    fn test_close_tolerates_removed_directory() {
        let (doc, root) = document("x");
        fs::remove_dir_all(&root).unwrap();
        assert!(doc.close().is_ok());
    }

    #[test]
    fn test_persist() {
        let (doc, root) = document("payload");
        let target = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(doc.persist(target.path()).unwrap(), 7);
        assert_eq!(fs::read_to_string(target.path()).unwrap(), "payload");
        assert!(!root.exists());
    }
}
