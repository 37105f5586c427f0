//! Verified byte-span edits of source files.
//!
//! Every change the tool writes to disk goes through [`Edit`]: a span, the
//! text that replaces it, and a check of what the span held when the edit
//! was planned. Files are rewritten atomically, so a crash or a concurrent
//! change never leaves half a fix behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Spans longer than this are verified by hash instead of by text.
const EXACT_MATCH_LIMIT: usize = 1024;

/// Replacement of `[byte_start, byte_end)` in `file` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() is called"]
pub struct Edit {
    pub file: PathBuf,
    pub byte_start: usize,
    pub byte_end: usize,
    pub new_text: String,
    pub expected_before: EditVerification,
}

/// What the span must contain before the edit may be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    /// Exact text for short spans, a hash for long ones.
    pub fn from_text(text: &str) -> Self {
        if text.len() > EXACT_MATCH_LIMIT {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} changed since it was analyzed (bytes {byte_start}..{byte_end})")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in file of length {file_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        file_len: usize,
    },

    #[error("overlapping edits in {file} at byte {byte_start}")]
    Overlap { file: PathBuf, byte_start: usize },

    #[error("I/O error on {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} is not valid UTF-8")]
    Utf8 { file: PathBuf },

    #[error("edit would split a UTF-8 character in {file}")]
    InvalidUtf8Edit { file: PathBuf },
}

/// Outcome for one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already held `new_text`.
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Replace the whole of `file`, which must still read `before`.
    pub fn replace_file(
        file: impl Into<PathBuf>,
        before: &str,
        after: impl Into<String>,
    ) -> Self {
        Self::new(file, 0, before.len(), after, before)
    }

    /// Check the span against `content`, returning the text it holds.
    fn current_text<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                file_len: content.len(),
            });
        }
        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or_else(|| EditError::InvalidUtf8Edit {
                file: self.file.clone(),
            })?;

        if current != self.new_text && !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }
        Ok(current)
    }

    /// Apply to in-memory `content` without touching the file.
    pub fn apply_to(&self, content: &str) -> Result<String, EditError> {
        self.current_text(content)?;
        let mut out = String::with_capacity(content.len() + self.new_text.len());
        out.push_str(&content[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&content[self.byte_end..]);
        Ok(out)
    }

    /// Apply to the file system atomically.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let mut results = apply_file_edits(&self.file, std::slice::from_ref(self))?;
        Ok(results.remove(0))
    }

    /// Apply edits to any number of files, one atomic write per file.
    ///
    /// Every edit of a file is verified before that file is written.
    pub fn apply_batch(mut edits: Vec<Edit>) -> Result<Vec<EditResult>, EditError> {
        edits.sort_by(|a, b| a.file.cmp(&b.file).then(b.byte_start.cmp(&a.byte_start)));

        let mut results = Vec::with_capacity(edits.len());
        for group in edits.chunk_by(|a, b| a.file == b.file) {
            results.extend(apply_file_edits(&group[0].file, group)?);
        }
        Ok(results)
    }
}

/// Apply edits sorted by descending start offset to one file.
fn apply_file_edits(file: &Path, edits: &[Edit]) -> Result<Vec<EditResult>, EditError> {
    let bytes = fs::read(file).map_err(|source| EditError::Io {
        file: file.to_path_buf(),
        source,
    })?;
    let original = String::from_utf8(bytes).map_err(|_| EditError::Utf8 {
        file: file.to_path_buf(),
    })?;

    for pair in edits.windows(2) {
        let (later, earlier) = (&pair[0], &pair[1]);
        if earlier.byte_end > later.byte_start {
            return Err(EditError::Overlap {
                file: file.to_path_buf(),
                byte_start: later.byte_start,
            });
        }
    }

    let mut content = original.clone();
    let mut results = Vec::with_capacity(edits.len());
    for edit in edits {
        if edit.current_text(&original)? == edit.new_text {
            results.push(EditResult::AlreadyApplied {
                file: file.to_path_buf(),
            });
            continue;
        }
        content.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
        results.push(EditResult::Applied {
            file: file.to_path_buf(),
            bytes_changed: edit.new_text.len(),
        });
    }

    if content != original {
        atomic_write(file, content.as_bytes()).map_err(|source| EditError::Io {
            file: file.to_path_buf(),
            source,
        })?;
    }
    Ok(results)
}

/// Write through a temporary file in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "if (ct.IsCancellationRequested) throw null;\nRun();\n";

    #[test]
    fn verification_switches_to_hash_for_long_text() {
        assert!(matches!(
            EditVerification::from_text("ct"),
            EditVerification::ExactMatch(_)
        ));
        let long = "x".repeat(2000);
        let verify = EditVerification::from_text(&long);
        assert!(matches!(verify, EditVerification::Hash(_)));
        assert!(verify.matches(&long));
        assert!(!verify.matches("x"));
    }

    #[test]
    fn apply_to_splices_in_memory() {
        let edit = Edit::new("A.cs", 0, 43, "ct.ThrowIfCancellationRequested();", &SOURCE[..43]);
        assert_eq!(
            edit.apply_to(SOURCE).unwrap(),
            "ct.ThrowIfCancellationRequested();\nRun();\n"
        );
    }

    #[test]
    fn stale_text_is_rejected() {
        let edit = Edit::new("A.cs", 0, 6, "Stop()", "Halt()");
        assert!(matches!(
            edit.apply_to("Run();"),
            Err(EditError::BeforeTextMismatch { .. })
        ));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let edit = Edit::new("A.cs", 4, 40, "", "");
        assert!(matches!(
            edit.apply_to("Run();"),
            Err(EditError::InvalidByteRange { .. })
        ));
        let inverted = Edit::new("A.cs", 4, 2, "", "");
        assert!(matches!(
            inverted.apply_to("Run();"),
            Err(EditError::InvalidByteRange { .. })
        ));
    }

    #[test]
    fn writes_files_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        fs::write(&path, SOURCE).unwrap();

        let edit = Edit::replace_file(&path, SOURCE, "Run();\n");
        assert!(matches!(edit.apply().unwrap(), EditResult::Applied { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Run();\n");

        // The file now holds the new text, so the same edit is a no-op.
        let again = Edit::new(&path, 0, 7, "Run();\n", "whatever");
        assert!(matches!(again.apply().unwrap(), EditResult::AlreadyApplied { .. }));
    }

    #[test]
    fn batch_applies_bottom_up_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        fs::write(&path, "A();\nB();\nC();\n").unwrap();

        let edits = vec![
            Edit::new(&path, 0, 1, "X", "A"),
            Edit::new(&path, 10, 11, "Z", "C"),
            Edit::new(&path, 5, 6, "Y", "B"),
        ];
        let results = Edit::apply_batch(edits).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), "X();\nY();\nZ();\n");
    }

    #[test]
    fn batch_rejects_overlaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        fs::write(&path, "A();\nB();\n").unwrap();

        let edits = vec![
            Edit::new(&path, 0, 6, "X", "A();\nB"),
            Edit::new(&path, 5, 6, "Y", "B"),
        ];
        assert!(matches!(
            Edit::apply_batch(edits),
            Err(EditError::Overlap { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "A();\nB();\n");
    }
}
