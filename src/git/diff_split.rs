//! Per-file unified diff splitting and lock-file filtering.

use std::sync::OnceLock;

use regex::Regex;

/// Marker that begins a per-file section in unified diff output.
const FILE_DIFF_MARKER: &str = "diff --git a/";

/// Matches the header line of a lock-file section, at any directory depth.
const LOCK_FILE_HEADER_PATTERN: &str =
    r"^diff --git a/(?:.*/)?(?:yarn\.lock|pnpm-lock\.yaml|package-lock\.json) b/";

static LOCK_FILE_HEADER: OnceLock<Regex> = OnceLock::new();

fn lock_file_header() -> &'static Regex {
    LOCK_FILE_HEADER.get_or_init(|| {
        #[allow(clippy::expect_used)] // constant pattern
        Regex::new(LOCK_FILE_HEADER_PATTERN).expect("lock-file header pattern is valid")
    })
}

/// A per-file slice of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path of the file (extracted from the `b/` side of `diff --git a/... b/...`).
    pub path: String,
    /// Raw text of this file's diff (header + all hunks).
    pub content: String,
    /// Byte length of `content`.
    pub byte_len: usize,
}

/// Outcome of removing lock-file sections from a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredDiff {
    /// Diff text with every lock-file section removed.
    pub diff: String,
    /// Whether any lines were dropped.
    pub lock_files_removed: bool,
}

impl FilteredDiff {
    /// Returns true when nothing but whitespace is left to analyze.
    pub fn is_blank(&self) -> bool {
        self.diff.trim().is_empty()
    }
}

/// Splits a flat unified diff at `diff --git a/` boundaries.
///
/// Returns one [`FileDiff`] for each file section found in the input.
/// An empty or whitespace-only input returns an empty `Vec`. Text before
/// the first marker is not part of any section.
pub fn split_by_file(diff: &str) -> Vec<FileDiff> {
    let mut result = Vec::new();
    let mut positions = Vec::new();

    // Find all positions where a file section starts (at line boundaries).
    if diff.starts_with(FILE_DIFF_MARKER) {
        positions.push(0);
    }
    let search = format!("\n{FILE_DIFF_MARKER}");
    let mut start = 0;
    while let Some(pos) = diff[start..].find(&search) {
        // +1 to skip the newline; the section starts at `diff`.
        positions.push(start + pos + 1);
        start = start + pos + 1;
    }

    for (i, &pos) in positions.iter().enumerate() {
        let end = positions.get(i + 1).copied().unwrap_or(diff.len());
        let content = &diff[pos..end];
        let first_line = content.lines().next().unwrap_or("");
        let path = extract_path_from_diff_header(first_line);

        result.push(FileDiff {
            path,
            content: content.to_string(),
            byte_len: content.len(),
        });
    }

    result
}

/// Removes `yarn.lock`, `pnpm-lock.yaml` and `package-lock.json` sections.
///
/// A lock-file header starts suppression; the next `diff --git` line ends
/// it and is kept unless it is itself a lock-file header. Line endings of
/// kept lines are preserved verbatim.
pub fn filter_lock_files(diff: &str) -> FilteredDiff {
    let mut kept = String::with_capacity(diff.len());
    let mut suppressing = false;

    for line in diff.split_inclusive('\n') {
        if line.starts_with("diff --git") {
            suppressing = lock_file_header().is_match(line);
        }
        if !suppressing {
            kept.push_str(line);
        }
    }

    let lock_files_removed = kept.len() != diff.len();
    FilteredDiff {
        diff: kept,
        lock_files_removed,
    }
}

/// Extracts the file path from the `b/` side of a `diff --git` header line.
fn extract_path_from_diff_header(header_line: &str) -> String {
    // Format: "diff --git a/old_path b/new_path"
    // Find the last " b/" to handle paths that may contain spaces.
    if let Some(b_pos) = header_line.rfind(" b/") {
        header_line[b_pos + 3..].to_string()
    } else {
        header_line
            .strip_prefix(FILE_DIFF_MARKER)
            .unwrap_or(header_line)
            .to_string()
    }
}
