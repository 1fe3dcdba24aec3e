//! Image/annotation pair indexing.
//!
//! Correlates an image directory and an annotation directory by basename,
//! producing the matched and unmatched sets. Listings are flat: nested files
//! are never paired, and nested annotation files trigger a warning so silent
//! drops don't go unnoticed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::annotation::ANNOTATION_EXTENSION;
use crate::error::LabelsweepError;

/// The matched/unmatched basename sets for a dataset directory pair.
#[derive(Clone, Debug, Default)]
pub struct PairIndex {
    /// Image basenames with no matching annotation file.
    pub images_without_annotation: Vec<String>,

    /// Annotation basenames with no matching image file.
    pub annotations_without_image: Vec<String>,

    /// Basenames present on both sides.
    pub matched: Vec<String>,
}

/// Build a [`PairIndex`] from one flat listing per side.
///
/// `image_ext` is the image extension without the leading dot (e.g. `jpg`).
pub fn build_pair_index(
    image_dir: &Path,
    annotation_dir: &Path,
    image_ext: &str,
) -> Result<PairIndex, LabelsweepError> {
    let image_stems = list_basenames(image_dir, image_ext)?;
    let annotation_stems = list_basenames(annotation_dir, ANNOTATION_EXTENSION)?;
    warn_nested_files(annotation_dir, ANNOTATION_EXTENSION);

    Ok(PairIndex {
        images_without_annotation: image_stems.difference(&annotation_stems).cloned().collect(),
        annotations_without_image: annotation_stems.difference(&image_stems).cloned().collect(),
        matched: image_stems.intersection(&annotation_stems).cloned().collect(),
    })
}

/// List the basenames of files in `dir` carrying the given extension.
///
/// The scan is flat and the extension match is case-insensitive. Results are
/// sorted for deterministic rule output.
pub fn list_basenames(dir: &Path, extension: &str) -> Result<BTreeSet<String>, LabelsweepError> {
    let mut stems = BTreeSet::new();

    for entry in fs::read_dir(dir).map_err(LabelsweepError::Io)? {
        let entry = entry.map_err(LabelsweepError::Io)?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extension) {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                stems.insert(stem.to_string());
            }
        }
    }

    Ok(stems)
}

/// Returns true if `path` has the given extension, ignoring ASCII case.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn warn_nested_files(dir: &Path, extension: &str) {
    let mut nested = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(2) {
        let Ok(entry) = entry else { continue };
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            nested.push(entry.path().to_path_buf());
        }
    }

    if !nested.is_empty() {
        nested.sort();
        let sample = rel_string(dir, &nested[0]);
        eprintln!(
            "Warning: directory scans are flat (non-recursive); skipping {} nested .{} file(s), e.g. {}",
            nested.len(),
            extension,
            sample
        );
    }
}

fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
