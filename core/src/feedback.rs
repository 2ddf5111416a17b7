use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng};

/// Directory holding the transient feedback files written by run commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackStore {
    dir: PathBuf,
}

impl FeedbackStore {
    const DIR_NAME: &str = "feedback";
    const FILE_PREFIX: &str = "feedback-";
    const FILE_EXT: &str = "md";
    const RANDOM_LEN: usize = 24;

    /// Ensures `<temp_root>/feedback` exists.
    pub fn create(temp_root: impl AsRef<Path>) -> fsutil::Result<Self> {
        let dir = temp_root.as_ref().join(Self::DIR_NAME);
        fsutil::mkdir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserves a fresh path inside the store. Nothing is created on disk.
    pub fn allocate(&self) -> PathBuf {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::RANDOM_LEN)
            .map(char::from)
            .collect();
        self.dir
            .join(format!("{}{}.{}", Self::FILE_PREFIX, suffix, Self::FILE_EXT))
    }

    /// Reads the feedback at `path` and deletes the file.
    ///
    /// A path that was never written fails like any other read error.
    pub fn collect(&self, path: impl AsRef<Path>) -> fsutil::Result<String> {
        fsutil::take_to_string(path)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn create_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let a = FeedbackStore::create(root.path()).unwrap();
        let b = FeedbackStore::create(root.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dir(), root.path().join("feedback"));
        assert!(a.dir().is_dir());
    }

    #[test]
    fn allocate_does_not_touch_disk_and_is_unique() {
        let root = tempfile::tempdir().unwrap();
        let store = FeedbackStore::create(root.path()).unwrap();
        let paths: HashSet<_> = (0..200).map(|_| store.allocate()).collect();
        assert_eq!(paths.len(), 200);
        for p in &paths {
            assert_eq!(p.parent(), Some(store.dir()));
            assert!(!p.exists());
        }
    }

    #[test]
    fn collect_reads_and_deletes() {
        let root = tempfile::tempdir().unwrap();
        let store = FeedbackStore::create(root.path()).unwrap();
        let path = store.allocate();
        fsutil::write(&path, "## Nice\nAll edge cases handled.").unwrap();

        assert_eq!(
            store.collect(&path).unwrap(),
            "## Nice\nAll edge cases handled."
        );
        assert!(!path.exists());
    }

    #[test]
    fn collect_of_unwritten_path_fails() {
        let root = tempfile::tempdir().unwrap();
        let store = FeedbackStore::create(root.path()).unwrap();
        assert!(store.collect(store.allocate()).is_err());
    }
}
