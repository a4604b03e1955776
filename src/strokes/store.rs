//! On-disk template layout.
//!
//! Every widget key owns a `<key>_strokes_dir` directory under the library
//! root holding one `stroke_NN.json` file per stroke. Each file is a JSON
//! array of `[x, y]` pairs in recording order.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const STROKES_DIR_SUFFIX: &str = "_strokes_dir";
pub const STROKE_FILE_PREFIX: &str = "stroke_";
pub const STROKE_FILE_EXT: &str = "json";

const STAGING_SUFFIX: &str = ".staging";
const RETIRED_SUFFIX: &str = ".retired";

pub type RawStroke = Vec<(f32, f32)>;

pub fn template_dir(root: &Path, widget_key: &str) -> PathBuf {
    root.join(format!("{widget_key}{STROKES_DIR_SUFFIX}"))
}

pub fn stroke_file_name(index: usize) -> String {
    format!("{STROKE_FILE_PREFIX}{index:02}.{STROKE_FILE_EXT}")
}

/// Read the strokes recorded for `widget_key`.
///
/// A missing or empty directory is `Ok(None)`.
pub fn load_strokes(root: &Path, widget_key: &str) -> Result<Option<Vec<RawStroke>>> {
    let dir = template_dir(root, widget_key);
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut files: Vec<(usize, PathBuf)> = fs::read_dir(&dir)
        .with_context(|| format!("list stroke files in {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter_map(|path| stroke_index(&path).map(|index| (index, path)))
        .collect();
    if files.is_empty() {
        return Ok(None);
    }
    // Numeric order: `stroke_100` comes after `stroke_99`, not after `stroke_10`.
    files.sort_by_key(|(index, _)| *index);

    let mut strokes = Vec::with_capacity(files.len());
    for (_, path) in files {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read stroke file {}", path.display()))?;
        let points: RawStroke = serde_json::from_str(&content)
            .with_context(|| format!("deserialize stroke file {}", path.display()))?;
        strokes.push(points);
    }
    Ok(Some(strokes))
}

/// Replace every stroke stored for `widget_key` with `strokes`.
///
/// Files are written to a staging directory first and swapped in with
/// renames, so a failed write leaves the previous template untouched.
pub fn save_strokes(root: &Path, widget_key: &str, strokes: &[RawStroke]) -> Result<()> {
    fs::create_dir_all(root)
        .with_context(|| format!("create strokes root {}", root.display()))?;

    let dir = template_dir(root, widget_key);
    let staging = sibling_with_suffix(&dir, STAGING_SUFFIX);
    let retired = sibling_with_suffix(&dir, RETIRED_SUFFIX);

    remove_dir_if_exists(&staging)?;
    fs::create_dir(&staging)
        .with_context(|| format!("create staging folder {}", staging.display()))?;

    for (index, points) in strokes.iter().enumerate() {
        let path = staging.join(stroke_file_name(index));
        let json = serde_json::to_string(points).context("serialize stroke points")?;
        fs::write(&path, json).with_context(|| format!("write stroke file {}", path.display()))?;
    }

    remove_dir_if_exists(&retired)?;
    if dir.exists() {
        fs::rename(&dir, &retired)
            .with_context(|| format!("retire previous strokes {}", dir.display()))?;
    }
    if let Err(err) = fs::rename(&staging, &dir) {
        let context = format!("install strokes into {}", dir.display());
        if retired.exists() {
            if let Err(restore_err) = fs::rename(&retired, &dir) {
                tracing::error!(
                    ?restore_err,
                    retired = %retired.display(),
                    "failed to restore previous strokes"
                );
                return Err(err).with_context(|| {
                    format!(
                        "{context}; previous strokes left in {}: {restore_err}",
                        retired.display()
                    )
                });
            }
        }
        return Err(err).context(context);
    }
    remove_dir_if_exists(&retired)
}

/// Delete the stroke directory of `widget_key`. Returns whether it existed.
pub fn remove_strokes(root: &Path, widget_key: &str) -> Result<bool> {
    let dir = template_dir(root, widget_key);
    if !dir.exists() {
        return Ok(false);
    }
    remove_dir_if_exists(&dir)?;
    Ok(true)
}

/// Widget keys with a stroke directory directly under `root`, sorted.
pub fn discover_keys(root: &Path) -> Vec<String> {
    let mut keys: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_suffix(STROKES_DIR_SUFFIX))
                .filter(|key| !key.is_empty())
                .map(str::to_string)
        })
        .collect();
    keys.sort();
    keys
}

/// Position encoded in a `stroke_NN.json` file name.
fn stroke_index(path: &Path) -> Option<usize> {
    if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(STROKE_FILE_EXT) {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix(STROKE_FILE_PREFIX)?
        .parse()
        .ok()
}

fn sibling_with_suffix(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    dir.with_file_name(name)
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir).with_context(|| format!("remove folder {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_files_are_zero_padded() {
        assert_eq!(stroke_file_name(0), "stroke_00.json");
        assert_eq!(stroke_file_name(12), "stroke_12.json");
    }

    #[test]
    fn strokes_load_in_numeric_order_past_one_hundred() {
        let dir = tempfile::tempdir().expect("temp dir");
        let strokes: Vec<RawStroke> = (0..105).map(|i| vec![(i as f32, 0.0)]).collect();

        save_strokes(dir.path(), "label", &strokes).unwrap();

        assert!(template_dir(dir.path(), "label").join("stroke_100.json").exists());
        assert_eq!(load_strokes(dir.path(), "label").unwrap(), Some(strokes));
    }

    #[test]
    fn stray_files_are_not_strokes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = template_dir(dir.path(), "label");
        fs::create_dir(&template).unwrap();
        fs::write(template.join("stroke_notes.json"), "[]").unwrap();
        fs::write(template.join("stroke_01.txt"), "[]").unwrap();
        assert_eq!(load_strokes(dir.path(), "label").unwrap(), None);

        fs::write(template.join("stroke_00.json"), "[[1.0,2.0]]").unwrap();
        assert_eq!(
            load_strokes(dir.path(), "label").unwrap(),
            Some(vec![vec![(1.0, 2.0)]])
        );
    }

    #[test]
    fn missing_and_empty_dirs_are_not_templates() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(load_strokes(dir.path(), "label").unwrap(), None);

        fs::create_dir(template_dir(dir.path(), "label")).unwrap();
        assert_eq!(load_strokes(dir.path(), "label").unwrap(), None);
    }

    #[test]
    fn save_discards_previous_strokes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let three = vec![vec![(0.0, 0.0)], vec![(1.0, 1.0)], vec![(2.0, 2.0)]];
        let one = vec![vec![(5.5, -3.25), (7.0, 8.0)]];

        save_strokes(dir.path(), "label", &three).unwrap();
        save_strokes(dir.path(), "label", &one).unwrap();

        assert_eq!(load_strokes(dir.path(), "label").unwrap(), Some(one));
        let files = fs::read_dir(template_dir(dir.path(), "label")).unwrap().count();
        assert_eq!(files, 1);
        assert!(!sibling_with_suffix(&template_dir(dir.path(), "label"), STAGING_SUFFIX).exists());
    }

    #[test]
    fn discovers_only_stroke_dirs() {
        let dir = tempfile::tempdir().expect("temp dir");
        save_strokes(dir.path(), "label", &[vec![(0.0, 0.0)]]).unwrap();
        save_strokes(dir.path(), "checked_check_box", &[vec![(0.0, 0.0)]]).unwrap();
        fs::create_dir(dir.path().join("unrelated")).unwrap();
        fs::write(dir.path().join("notes_strokes_dir"), "file, not a dir").unwrap();

        assert_eq!(
            discover_keys(dir.path()),
            vec!["checked_check_box".to_string(), "label".to_string()]
        );
    }

    #[test]
    fn corrupt_stroke_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let template = template_dir(dir.path(), "label");
        fs::create_dir(&template).unwrap();
        fs::write(template.join(stroke_file_name(0)), "not json").unwrap();

        assert!(load_strokes(dir.path(), "label").is_err());
    }
}
