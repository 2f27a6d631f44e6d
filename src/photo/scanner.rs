// SPDX-FileCopyrightText: © 2024 David Bliss
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::model::GeoRecord;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Photos keyed by the Unix timestamp of their GPS fix.
pub type GeoIndex = BTreeMap<i64, GeoRecord>;

/// File suffixes of formats that commonly carry EXIF data.
pub const PICTURE_SUFFIXES: &[&str] = &[
    "avif", "dng", "heic", "jpeg", "jpg", "jxl", "png", "tif", "tiff", "webp",
];

/// Indexes every photo under a directory tree that carries a full GPS location and time.
pub fn aggregate(scan_base: &Path) -> GeoIndex {
    Aggregator::new(scan_base).aggregate()
}

/// Walks a file system and collects GPS records of photos.
#[derive(Debug, Clone)]
pub struct Aggregator {
    /// File system path to scan.
    scan_base: PathBuf,

    follow_links: bool,

    /// Lower case suffixes to accept. `None` accepts every file.
    suffixes: Option<Vec<String>>,
}

impl Aggregator {
    pub fn new(scan_base: &Path) -> Self {
        Self {
            scan_base: PathBuf::from(scan_base),
            follow_links: false,
            suffixes: None,
        }
    }

    /// Follow symbolic links to directories while walking. Off by default.
    pub fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Only read files with one of these suffixes. Matching ignores case.
    pub fn picture_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.suffixes = Some(
            suffixes
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        );
        self
    }

    pub fn aggregate(&self) -> GeoIndex {
        self.aggregate_until(&AtomicBool::new(false))
    }

    /// Like [`Aggregator::aggregate`], but stops early once `stop` is set and
    /// returns whatever was indexed up to that point.
    pub fn aggregate_until(&self, stop: &AtomicBool) -> GeoIndex {
        let start = std::time::Instant::now();

        let mut index = GeoIndex::new();
        self.scan_all_visit(stop, |path, record| insert(&mut index, path, record));

        info!(
            "Indexed {} photos with GPS data under {:?} in {} seconds.",
            index.len(),
            self.scan_base,
            start.elapsed().as_secs()
        );
        index
    }

    /// Reads files in parallel. Collisions resolve in traversal order,
    /// so the result is the same as [`Aggregator::aggregate`].
    pub fn par_aggregate(&self) -> GeoIndex {
        self.par_aggregate_until(&AtomicBool::new(false))
    }

    pub fn par_aggregate_until(&self, stop: &AtomicBool) -> GeoIndex {
        let start = std::time::Instant::now();

        let paths: Vec<PathBuf> = self.candidates(stop).collect();

        let records: Vec<(PathBuf, Option<GeoRecord>)> = paths
            .into_par_iter()
            .map(|path| {
                if stop.load(Ordering::Relaxed) {
                    return (path, None);
                }
                let record = extract(&path);
                (path, record)
            })
            .collect();

        let mut index = GeoIndex::new();
        records
            .into_iter()
            .filter_map(|(path, record)| record.map(|r| (path, r)))
            .for_each(|(path, record)| insert(&mut index, &path, record));

        info!(
            "Indexed {} photos with GPS data under {:?} in {} seconds.",
            index.len(),
            self.scan_base,
            start.elapsed().as_secs()
        );
        index
    }

    /// Visits every photo with a complete GPS record, in traversal order.
    pub fn scan_all_visit<F>(&self, stop: &AtomicBool, mut func: F)
    where
        F: FnMut(&Path, GeoRecord),
    {
        self.candidates(stop).for_each(|path| {
            if let Some(record) = extract(&path) {
                func(&path, record);
            }
        });
    }

    /// Paths of files worth reading, sorted by file name within each directory.
    fn candidates<'a>(&'a self, stop: &'a AtomicBool) -> impl Iterator<Item = PathBuf> + 'a {
        WalkDir::new(&self.scan_base)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| !stop.load(Ordering::Relaxed))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| !entry.file_type().is_dir())
            .filter(move |entry| self.has_picture_suffix(entry.path()))
            .map(|entry| entry.into_path())
    }

    fn has_picture_suffix(&self, path: &Path) -> bool {
        let Some(ref suffixes) = self.suffixes else {
            return true;
        };

        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .is_some_and(|ext| suffixes.contains(&ext))
    }
}

/// A record for `path` if it can be read and has all GPS tags.
fn extract(path: &Path) -> Option<GeoRecord> {
    match GeoRecord::from_path(path) {
        Ok(record) if record.is_complete() => Some(record),
        Ok(record) => {
            debug!(
                "Skipping {:?}: missing {:?}",
                path,
                record.missing_fields()
            );
            None
        }
        Err(e) => {
            debug!("Skipping {:?}: {}", path, e);
            None
        }
    }
}

fn insert(index: &mut GeoIndex, path: &Path, record: GeoRecord) {
    let timestamp = record.unix();
    if index.insert(timestamp, record).is_some() {
        warn!(
            "{:?} has the same GPS time {} as an earlier photo and replaces it",
            path, timestamp
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn suffix_filter_ignores_case() {
        let s = Aggregator::new(Path::new(".")).picture_suffixes(PICTURE_SUFFIXES);
        assert!(s.has_picture_suffix(Path::new("a/Dog.JPG")));
        assert!(s.has_picture_suffix(Path::new("Frog.tiff")));
        assert!(!s.has_picture_suffix(Path::new("notes.txt")));
        assert!(!s.has_picture_suffix(Path::new("README")));
    }

    #[test]
    fn no_suffix_filter_accepts_everything() {
        let s = Aggregator::new(Path::new("."));
        assert!(s.has_picture_suffix(Path::new("README")));
        assert!(s.has_picture_suffix(Path::new("notes.txt")));
    }

    #[test]
    fn candidates_skip_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.txt"), b"b").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let s = Aggregator::new(dir.path());
        let stop = AtomicBool::new(false);
        let all: Vec<PathBuf> = s.candidates(&stop).collect();

        assert_eq!(2, all.len());
        assert!(all[0].ends_with("a.txt"));
        assert!(all[1].ends_with("nested/b.txt"));
    }

    #[test]
    fn stop_before_start() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let s = Aggregator::new(dir.path());
        let stop = AtomicBool::new(true);
        assert_eq!(0, s.candidates(&stop).count());
        assert!(s.aggregate_until(&stop).is_empty());
    }

    #[test]
    fn missing_root_is_empty() {
        assert!(aggregate(Path::new("/no/such/directory")).is_empty());
    }

    #[test]
    fn files_without_exif_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        fs::write(dir.path().join("fake.jpg"), b"\xff\xd8\xff\xd9").unwrap();

        assert!(aggregate(dir.path()).is_empty());
        assert!(Aggregator::new(dir.path()).par_aggregate().is_empty());
    }
}
