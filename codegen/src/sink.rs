//! Output directory for generated files.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::format::GENERATED_MARKER;

/// Directory receiving generated `.rs` files.
///
/// # Examples
///
/// ```no_run
/// use datatier_codegen::OutputSink;
///
/// let sink = OutputSink::new("src/data");
/// sink.prepare(true).unwrap();
/// sink.write("albums.rs", "pub struct Albums;\n").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if needed. With `clean`, removes `.rs` files a
    /// previous run generated; hand-written files are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) if the directory
    /// cannot be created or listed, or a file cannot be removed.
    pub fn prepare(&self, clean: bool) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        if !clean {
            return Ok(());
        }

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_rust = path.extension().is_some_and(|ext| ext == "rs");
            if path.is_file() && is_rust && was_generated(&path)? {
                debug!(path = %path.display(), "removing previously generated file");
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Writes one file, replacing any existing file of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CodegenError::IoError) if the file cannot
    /// be written.
    pub fn write(&self, file_name: &str, source: &str) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, source)?;
        Ok(path)
    }
}

fn was_generated(path: &Path) -> Result<bool> {
    let mut first_line = String::new();
    BufReader::new(fs::File::open(path)?).read_line(&mut first_line)?;
    Ok(first_line.starts_with(GENERATED_MARKER))
}
