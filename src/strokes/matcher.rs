use crate::strokes::geometry::{hausdorff_symmetric, ratio_logs_similar, Point};
use crate::strokes::index::SignatureIndex;
use crate::strokes::model::{Gesture, ShapeSignature};

pub const DEFAULT_MATCH_TOLERANCE: f32 = 60.0;

/// Tolerance used by the proportion pre-filter when it is switched on
/// without an explicit value.
pub const DEFAULT_RATIO_LOG_TOLERANCE: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub distance: f32,
    pub widget_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Best distance within tolerance.
    Matched,
    /// Candidates were ranked but the best one is above tolerance.
    Ambiguous,
    /// The signature bucket had templates, but the proportion filter
    /// rejected all of them.
    ProportionsMismatched,
    /// No template shares the gesture's signature.
    NoCandidates,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Ambiguous => "ambiguous",
            MatchStatus::ProportionsMismatched => "proportions_mismatched",
            MatchStatus::NoCandidates => "no_candidates",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub status: MatchStatus,
    pub signature: ShapeSignature,
    /// Ascending by distance, ties broken by widget key.
    pub ranked: Vec<MatchResult>,
    pub tolerance: f32,
    /// Templates found in the signature bucket before any filtering.
    pub bucket_size: usize,
}

impl MatchReport {
    pub fn best(&self) -> Option<&MatchResult> {
        self.ranked.first()
    }

    /// The best result, only when it is a confident match.
    pub fn matched(&self) -> Option<&MatchResult> {
        match self.status {
            MatchStatus::Matched => self.best(),
            _ => None,
        }
    }

    /// Whether the UI should ask the user which widget was meant.
    pub fn should_prompt(&self, prompt_always: bool) -> bool {
        match self.status {
            MatchStatus::Matched => prompt_always,
            MatchStatus::Ambiguous => true,
            MatchStatus::ProportionsMismatched | MatchStatus::NoCandidates => false,
        }
    }

    /// Status-bar style description of the outcome.
    pub fn explanation(&self) -> String {
        match (self.status, self.best()) {
            (MatchStatus::Matched, Some(best)) => format!(
                "matched {} (distance {:.1})",
                best.widget_key, best.distance
            ),
            (MatchStatus::Ambiguous, Some(best)) => format!(
                "closest template {} is {:.1} away, above tolerance {:.1}",
                best.widget_key, best.distance, self.tolerance
            ),
            (MatchStatus::ProportionsMismatched, _) => format!(
                "{} template(s) share stroke shapes {} but none has matching proportions",
                self.bucket_size, self.signature
            ),
            _ => format!(
                "no template with matching stroke shapes ({})",
                self.signature
            ),
        }
    }
}

/// Scores gestures against a [`SignatureIndex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    tolerance: f32,
    ratio_log_tolerance: Option<f32>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_TOLERANCE)
    }
}

impl Matcher {
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            ratio_log_tolerance: None,
        }
    }

    /// Also drop candidates whose per-stroke width/height ratio logs differ
    /// from the gesture's by more than `tolerance`.
    pub fn with_ratio_log_filter(mut self, tolerance: Option<f32>) -> Self {
        self.ratio_log_tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn ratio_log_tolerance(&self) -> Option<f32> {
        self.ratio_log_tolerance
    }

    /// Candidates sharing the gesture's signature, ascending by mean
    /// per-stroke Hausdorff distance. Empty when nothing qualifies.
    pub fn rank(&self, gesture: &Gesture, index: &SignatureIndex) -> Vec<MatchResult> {
        self.evaluate(gesture, index).ranked
    }

    pub fn evaluate(&self, gesture: &Gesture, index: &SignatureIndex) -> MatchReport {
        let signature = gesture.signature();
        let bucket = index.lookup(&signature);
        let bucket_size = bucket.len();

        let query = gesture.normalized_strokes();
        let query_ratio_logs = gesture.ratio_logs();
        let mut ranked: Vec<MatchResult> = bucket
            .iter()
            .filter(|(widget_key, template)| match self.ratio_log_tolerance {
                Some(tolerance) => {
                    let similar =
                        ratio_logs_similar(&query_ratio_logs, &template.ratio_logs, tolerance);
                    if !similar {
                        tracing::debug!(key = %widget_key, "candidate rejected by proportions");
                    }
                    similar
                }
                None => true,
            })
            .filter_map(|(widget_key, template)| {
                let distance = mean_stroke_distance(&query, &template.strokes)?;
                tracing::debug!(key = %widget_key, distance, "scored candidate");
                Some(MatchResult {
                    distance,
                    widget_key: widget_key.clone(),
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.widget_key.cmp(&b.widget_key))
        });

        let status = match ranked.first() {
            Some(best) if best.distance <= self.tolerance => MatchStatus::Matched,
            Some(_) => MatchStatus::Ambiguous,
            None if bucket_size > 0 => MatchStatus::ProportionsMismatched,
            None => MatchStatus::NoCandidates,
        };

        let report = MatchReport {
            status,
            signature,
            ranked,
            tolerance: self.tolerance,
            bucket_size,
        };
        tracing::info!(
            status = %report.status,
            signature = %report.signature,
            candidates = report.ranked.len(),
            best = report.best().map(|best| best.widget_key.as_str()).unwrap_or("none"),
            "gesture evaluated"
        );
        report
    }
}

/// Mean over stroke position of the symmetric Hausdorff distance between
/// stroke `i` of `query` and stroke `i` of `template`.
///
/// `None` when the stroke counts differ or there are no strokes.
pub fn mean_stroke_distance(query: &[Vec<Point>], template: &[Vec<Point>]) -> Option<f32> {
    if query.is_empty() || query.len() != template.len() {
        return None;
    }
    let mut total = 0.0;
    for (query_stroke, template_stroke) in query.iter().zip(template) {
        total += hausdorff_symmetric(query_stroke, template_stroke).ok()?;
    }
    Some(total / query.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(strokes: Vec<Vec<(f32, f32)>>) -> Gesture {
        Gesture::from_coords(strokes).unwrap()
    }

    fn line(length: f32) -> Gesture {
        gesture(vec![vec![(0.0, 0.0), (length, 0.0)]])
    }

    #[test]
    fn stroke_count_mismatch_has_no_distance() {
        let a = vec![vec![Point::new(0.0, 0.0)]];
        let b = vec![vec![Point::new(0.0, 0.0)], vec![Point::new(1.0, 1.0)]];
        assert_eq!(mean_stroke_distance(&a, &b), None);
        assert_eq!(mean_stroke_distance(&[], &[]), None);
    }

    #[test]
    fn mean_is_taken_over_positional_pairs() {
        let a = vec![
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            vec![Point::new(0.0, 0.0)],
        ];
        let b = vec![
            vec![Point::new(0.0, 0.0), Point::new(14.0, 0.0)],
            vec![Point::new(0.0, 6.0)],
        ];
        assert_eq!(mean_stroke_distance(&a, &b), Some(5.0));
    }

    #[test]
    fn empty_gesture_has_no_candidates() {
        let mut index = SignatureIndex::new();
        index.insert("label", &line(100.0));
        let report = Matcher::default().evaluate(&Gesture::default(), &index);
        assert_eq!(report.status, MatchStatus::NoCandidates);
        assert!(report.ranked.is_empty());
    }

    #[test]
    fn tolerance_separates_matched_from_ambiguous() {
        let mut index = SignatureIndex::new();
        index.insert("label", &line(100.0));

        let close = Matcher::new(60.0).evaluate(&line(130.0), &index);
        assert_eq!(close.status, MatchStatus::Matched);
        assert_eq!(close.matched().map(|m| m.distance), Some(30.0));

        let far = Matcher::new(20.0).evaluate(&line(130.0), &index);
        assert_eq!(far.status, MatchStatus::Ambiguous);
        assert!(far.matched().is_none());
        assert_eq!(far.best().map(|m| m.widget_key.as_str()), Some("label"));
        assert!(far.should_prompt(false));
    }

    #[test]
    fn proportion_filter_reports_mismatch() {
        let mut index = SignatureIndex::new();
        index.insert(
            "label",
            &gesture(vec![vec![(0.0, 0.0), (100.0, 0.0), (100.0, 10.0)]]),
        );
        let query = gesture(vec![vec![(0.0, 0.0), (100.0, 0.0), (100.0, 60.0)]]);
        assert_eq!(query.signature(), index.signature_of("label").cloned().unwrap());

        let plain = Matcher::new(60.0).evaluate(&query, &index);
        assert_eq!(plain.ranked.len(), 1);

        let filtered = Matcher::new(60.0)
            .with_ratio_log_filter(Some(DEFAULT_RATIO_LOG_TOLERANCE))
            .evaluate(&query, &index);
        assert_eq!(filtered.status, MatchStatus::ProportionsMismatched);
        assert_eq!(filtered.bucket_size, 1);
        assert!(filtered.explanation().contains("proportions"));
    }
}
