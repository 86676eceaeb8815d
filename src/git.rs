//! Git operations and repository management.

pub mod diff_split;
pub mod repository;

pub use diff_split::{filter_lock_files, split_by_file, FileDiff, FilteredDiff};
pub use repository::GitRepository;
