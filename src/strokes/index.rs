use crate::strokes::geometry::Point;
use crate::strokes::model::{Gesture, ShapeSignature};
use std::collections::{BTreeMap, HashMap};

/// A template as the matcher sees it: every stroke offset to its own
/// origin, plus the per-stroke ratio logs for the optional proportion
/// filter.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTemplate {
    pub strokes: Vec<Vec<Point>>,
    pub ratio_logs: Vec<f32>,
}

impl IndexedTemplate {
    pub fn from_gesture(gesture: &Gesture) -> Self {
        Self {
            strokes: gesture.normalized_strokes(),
            ratio_logs: gesture.ratio_logs(),
        }
    }
}

pub type Bucket = BTreeMap<String, IndexedTemplate>;

static EMPTY_BUCKET: Bucket = BTreeMap::new();

/// Templates bucketed by shape signature.
#[derive(Debug, Clone, Default)]
pub struct SignatureIndex {
    buckets: HashMap<ShapeSignature, Bucket>,
    signatures: HashMap<String, ShapeSignature>,
}

impl SignatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `gesture` under `widget_key`, dropping whatever entry the key
    /// held before. Returns the signature it was filed under.
    pub fn insert(&mut self, widget_key: &str, gesture: &Gesture) -> ShapeSignature {
        self.remove(widget_key);
        let signature = gesture.signature();
        self.buckets
            .entry(signature.clone())
            .or_default()
            .insert(widget_key.to_string(), IndexedTemplate::from_gesture(gesture));
        self.signatures
            .insert(widget_key.to_string(), signature.clone());
        signature
    }

    pub fn remove(&mut self, widget_key: &str) -> Option<ShapeSignature> {
        let signature = self.signatures.remove(widget_key)?;
        if let Some(bucket) = self.buckets.get_mut(&signature) {
            bucket.remove(widget_key);
            if bucket.is_empty() {
                self.buckets.remove(&signature);
            }
        }
        Some(signature)
    }

    /// Templates sharing `signature`, keyed and ordered by widget key.
    pub fn lookup(&self, signature: &ShapeSignature) -> &Bucket {
        self.buckets.get(signature).unwrap_or(&EMPTY_BUCKET)
    }

    pub fn signature_of(&self, widget_key: &str) -> Option<&ShapeSignature> {
        self.signatures.get(widget_key)
    }

    pub fn contains(&self, widget_key: &str) -> bool {
        self.signatures.contains_key(widget_key)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.signatures.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strokes::geometry::Orientation;

    fn landscape() -> Gesture {
        Gesture::from_coords(vec![vec![(0.0, 0.0), (100.0, 10.0)]]).unwrap()
    }

    fn portrait() -> Gesture {
        Gesture::from_coords(vec![vec![(0.0, 0.0), (10.0, 100.0)]]).unwrap()
    }

    #[test]
    fn reinsert_moves_key_between_buckets() {
        let mut index = SignatureIndex::new();
        index.insert("label", &landscape());
        index.insert("label", &portrait());

        assert!(index
            .lookup(&ShapeSignature(vec![Orientation::Landscape]))
            .is_empty());
        assert!(index
            .lookup(&ShapeSignature(vec![Orientation::Portrait]))
            .contains_key("label"));
        assert_eq!(index.len(), 1);
        assert_eq!(index.bucket_count(), 1);
    }

    #[test]
    fn lookup_of_unknown_signature_is_empty() {
        let index = SignatureIndex::new();
        assert!(index.lookup(&ShapeSignature::default()).is_empty());
    }

    #[test]
    fn stored_strokes_are_normalized() {
        let mut index = SignatureIndex::new();
        let gesture = Gesture::from_coords(vec![vec![(40.0, 50.0), (140.0, 60.0)]]).unwrap();
        let signature = index.insert("label", &gesture);

        let entry = &index.lookup(&signature)["label"];
        assert_eq!(
            entry.strokes,
            vec![vec![Point::new(0.0, 0.0), Point::new(100.0, 10.0)]]
        );
        assert_eq!(entry.ratio_logs.len(), 1);
    }

    #[test]
    fn remove_clears_empty_bucket() {
        let mut index = SignatureIndex::new();
        index.insert("label", &landscape());
        assert_eq!(
            index.remove("label"),
            Some(ShapeSignature(vec![Orientation::Landscape]))
        );
        assert_eq!(index.remove("label"), None);
        assert_eq!(index.bucket_count(), 0);
    }
}
