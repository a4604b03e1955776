use crate::strokes::index::SignatureIndex;
use crate::strokes::model::{Gesture, ShapeSignature};
use crate::strokes::store;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Widgets the builder knows how to place.
pub const KNOWN_WIDGET_KEYS: [&str; 3] = ["label", "unchecked_check_box", "checked_check_box"];

#[derive(Debug)]
pub enum TemplateError {
    InvalidKey(String),
    EmptyGesture,
    Persistence(anyhow::Error),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::InvalidKey(key) => write!(f, "invalid widget key {key:?}"),
            TemplateError::EmptyGesture => f.write_str("a template needs at least one stroke"),
            TemplateError::Persistence(err) => write!(f, "failed to persist template: {err:#}"),
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::Persistence(err) => Some(&**err),
            _ => None,
        }
    }
}

/// Widget keys double as directory names, so only ASCII alphanumerics,
/// `_` and `-` are accepted.
pub fn validate_widget_key(widget_key: &str) -> Result<(), TemplateError> {
    let valid = !widget_key.is_empty()
        && widget_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidKey(widget_key.to_string()))
    }
}

/// Persisted templates plus their signature index.
///
/// Writes hold the index write lock across both the file-system update and
/// the index update, so readers only ever see the state before or after a
/// save.
#[derive(Debug)]
pub struct TemplateLibrary {
    root: PathBuf,
    index: RwLock<SignatureIndex>,
}

impl TemplateLibrary {
    /// Library rooted at `root` with every readable template indexed.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let library = Self::empty(root);
        let indexed = library.reload();
        tracing::info!(root = %library.root.display(), indexed, "opened template library");
        library
    }

    /// Library rooted at `root` without scanning it.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: RwLock::new(SignatureIndex::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rebuild the index from disk. Returns the number of indexed templates.
    pub fn reload(&self) -> usize {
        let mut index = self.write_index();
        let mut rebuilt = SignatureIndex::new();
        for key in store::discover_keys(&self.root) {
            if validate_widget_key(&key).is_err() {
                tracing::warn!(key = %key, "skipping stroke folder with invalid widget key");
                continue;
            }
            match self.read_template(&key) {
                Ok(Some(gesture)) => {
                    rebuilt.insert(&key, &gesture);
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(?err, key = %key, "skipping unreadable template");
                }
            }
        }
        *index = rebuilt;
        index.len()
    }

    /// Template recorded for `widget_key`. Read failures are logged and
    /// reported as "no template".
    pub fn load(&self, widget_key: &str) -> Option<Gesture> {
        match self.try_load(widget_key) {
            Ok(gesture) => gesture,
            Err(err) => {
                tracing::warn!(?err, key = %widget_key, "failed to load template");
                None
            }
        }
    }

    pub fn try_load(&self, widget_key: &str) -> anyhow::Result<Option<Gesture>> {
        validate_widget_key(widget_key)?;
        let _index = self.read_index();
        self.read_template(widget_key)
    }

    /// Replace the template of `widget_key` with `gesture` and re-file it in
    /// the index.
    pub fn save(
        &self,
        widget_key: &str,
        gesture: &Gesture,
    ) -> Result<ShapeSignature, TemplateError> {
        validate_widget_key(widget_key)?;
        if gesture.is_empty() {
            return Err(TemplateError::EmptyGesture);
        }

        let mut index = self.write_index();
        store::save_strokes(&self.root, widget_key, &gesture.to_coords()).map_err(|err| {
            tracing::error!(?err, key = %widget_key, "failed to save template");
            TemplateError::Persistence(err)
        })?;
        let signature = index.insert(widget_key, gesture);
        tracing::info!(
            key = %widget_key,
            strokes = gesture.len(),
            signature = %signature,
            "saved template"
        );
        Ok(signature)
    }

    /// Delete the template of `widget_key`. Returns whether one existed.
    pub fn remove(&self, widget_key: &str) -> Result<bool, TemplateError> {
        validate_widget_key(widget_key)?;
        let mut index = self.write_index();
        let existed = store::remove_strokes(&self.root, widget_key).map_err(|err| {
            tracing::error!(?err, key = %widget_key, "failed to remove template");
            TemplateError::Persistence(err)
        })?;
        let indexed = index.remove(widget_key).is_some();
        if existed || indexed {
            tracing::info!(key = %widget_key, "removed template");
        }
        Ok(existed || indexed)
    }

    pub fn keys(&self) -> Vec<String> {
        self.read_index().keys()
    }

    pub fn index(&self) -> RwLockReadGuard<'_, SignatureIndex> {
        self.read_index()
    }

    fn read_template(&self, widget_key: &str) -> anyhow::Result<Option<Gesture>> {
        let Some(raw) = store::load_strokes(&self.root, widget_key)? else {
            return Ok(None);
        };
        let gesture = Gesture::from_coords(raw)
            .with_context(|| format!("template {widget_key} holds an empty stroke"))?;
        Ok(Some(gesture))
    }

    fn read_index(&self) -> RwLockReadGuard<'_, SignatureIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, SignatureIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }
}
