//! Experiment Key - the `(iters, history)` coordinate of one run

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Experiment Key identifies one run of the parameter sweep.
///
/// Ordering is by `iters`, then `history`, which matches the row-major
/// layout of [`ExperimentMatrix`](crate::matrix::ExperimentMatrix).
/// Serializes as its label, e.g. `"33_10"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ExperimentKey {
    iters: u64,
    history: u64,
}

impl ExperimentKey {
    /// Create a key from its two swept parameters.
    #[must_use]
    pub const fn new(iters: u64, history: u64) -> Self {
        Self { iters, history }
    }

    /// Iteration count `I`.
    #[must_use]
    pub const fn iters(&self) -> u64 {
        self.iters
    }

    /// History length `H`.
    #[must_use]
    pub const fn history(&self) -> u64 {
        self.history
    }

    /// Canonical string form, `"<iters>_<history>"`.
    #[must_use]
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Extract the key from the nearest ancestor directory named like `33_10`.
    ///
    /// The file name itself is not considered. Ancestors are walked upward
    /// so that layouts such as `10_1/outputs/metrics.csv` resolve. Existing
    /// files are searched by their canonical path, so `..` components and
    /// symlinks resolve to the directory the file actually lives in. Paths
    /// that cannot be canonicalized are searched as given.
    ///
    /// ```rust
    /// use sweep_effects::experiment::ExperimentKey;
    ///
    /// let key = ExperimentKey::from_path("runs/33_10/outputs/metrics.csv")?;
    /// assert_eq!(key, ExperimentKey::new(33, 10));
    /// # Ok::<(), sweep_effects::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelNotFound`] if no ancestor matches.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let found = match path.canonicalize() {
            Ok(resolved) => Self::search_ancestors(&resolved),
            Err(_) => Self::search_ancestors(path),
        };

        found.ok_or_else(|| Error::LabelNotFound {
            path: path.to_path_buf(),
        })
    }

    fn search_ancestors(path: &Path) -> Option<Self> {
        path.ancestors()
            .skip(1)
            .filter_map(Path::file_name)
            .find_map(|name| name.to_str().and_then(Self::parse_dir_name))
    }

    /// Whole-name match: `^[0-9]+[_-][0-9]+$`.
    fn parse_dir_name(name: &str) -> Option<Self> {
        let (iters, history) = name.split_once(|c: char| c == '_' || c == '-')?;
        let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !is_digits(iters) || !is_digits(history) {
            return None;
        }
        Some(Self::new(iters.parse().ok()?, history.parse().ok()?))
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.iters, self.history)
    }
}

impl FromStr for ExperimentKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_dir_name(s.trim()).ok_or_else(|| Error::InvalidLabel(s.to_string()))
    }
}

impl From<ExperimentKey> for String {
    fn from(key: ExperimentKey) -> Self {
        key.label()
    }
}

impl TryFrom<String> for ExperimentKey {
    type Error = Error;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<(u64, u64)> for ExperimentKey {
    fn from((iters, history): (u64, u64)) -> Self {
        Self::new(iters, history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        let key = ExperimentKey::new(33, 10);
        assert_eq!(key.label(), "33_10");
        assert_eq!("33_10".parse::<ExperimentKey>().unwrap(), key);
        assert_eq!("33-10".parse::<ExperimentKey>().unwrap(), key);
    }

    #[test]
    fn test_from_path_immediate_parent() {
        let key = ExperimentKey::from_path("0-1/metrics.csv").unwrap();
        assert_eq!(key, ExperimentKey::new(0, 1));
    }

    #[test]
    fn test_from_path_nested() {
        let key = ExperimentKey::from_path("sweep/10_1/outputs/metrics_aligned_se3.csv").unwrap();
        assert_eq!(key.iters(), 10);
        assert_eq!(key.history(), 1);
    }

    #[test]
    fn test_from_path_nearest_wins() {
        let key = ExperimentKey::from_path("5_5/20_3/metrics.csv").unwrap();
        assert_eq!(key, ExperimentKey::new(20, 3));
    }

    #[test]
    fn test_from_path_requires_whole_name() {
        let err = ExperimentKey::from_path("run_33_10_v2/metrics.csv").unwrap_err();
        assert!(matches!(err, Error::LabelNotFound { .. }));
    }

    #[test]
    fn test_file_name_is_not_a_label() {
        assert!(ExperimentKey::from_path("33_10").is_err());
    }

    #[test]
    fn test_from_path_resolves_parent_components() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("0_1")).unwrap();
        std::fs::create_dir_all(tmp.path().join("run")).unwrap();
        std::fs::write(tmp.path().join("run").join("metrics.csv"), "name,rmse\n").unwrap();

        let through_label = tmp.path().join("0_1").join("..").join("run").join("metrics.csv");
        assert!(matches!(
            ExperimentKey::from_path(&through_label),
            Err(Error::LabelNotFound { .. })
        ));
    }

    #[test]
    fn test_from_path_canonical_label() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("33_10").join("outputs");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::create_dir_all(tmp.path().join("run")).unwrap();
        std::fs::write(dir.join("metrics.csv"), "name,rmse\n").unwrap();

        let via_sibling = tmp
            .path()
            .join("run")
            .join("..")
            .join("33_10")
            .join("outputs")
            .join("metrics.csv");
        assert_eq!(
            ExperimentKey::from_path(&via_sibling).unwrap(),
            ExperimentKey::new(33, 10)
        );
    }

    #[test]
    fn test_invalid_label() {
        assert!(matches!(
            "33x10".parse::<ExperimentKey>(),
            Err(Error::InvalidLabel(_))
        ));
        assert!("-1_3".parse::<ExperimentKey>().is_err());
    }

    #[test]
    fn test_serde_as_label() {
        let key = ExperimentKey::new(0, 1);
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"0_1\"");
        let back: ExperimentKey = serde_json::from_str("\"33-10\"").unwrap();
        assert_eq!(back, ExperimentKey::new(33, 10));
    }

    #[test]
    fn test_ordering_is_row_major() {
        let mut keys = vec![
            ExperimentKey::new(10, 1),
            ExperimentKey::new(0, 10),
            ExperimentKey::new(0, 1),
        ];
        keys.sort();
        assert_eq!(keys[0], ExperimentKey::new(0, 1));
        assert_eq!(keys[2], ExperimentKey::new(10, 1));
    }
}
