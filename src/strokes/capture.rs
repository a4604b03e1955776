use crate::strokes::geometry::Point;
use crate::strokes::model::{Gesture, Stroke};

pub const DEFAULT_JITTER_THRESHOLD: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    NoStrokeInProgress,
    StrokeInProgress,
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::NoStrokeInProgress => f.write_str("no stroke in progress"),
            CaptureError::StrokeInProgress => f.write_str("a stroke is already in progress"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Issued when a stroke ends. Only the most recent ticket can finalize the
/// gesture; starting a new stroke invalidates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket(u64);

impl TimerTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Started { cancelled_timer: bool },
    Appended,
    Discarded,
}

/// Turns pointer events into the strokes of one gesture.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    jitter_threshold: f32,
    strokes: Vec<Stroke>,
    current: Option<Stroke>,
    generation: u64,
    pending: Option<TimerTicket>,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_THRESHOLD)
    }
}

impl CaptureSession {
    pub fn new(jitter_threshold: f32) -> Self {
        Self {
            jitter_threshold,
            strokes: Vec::new(),
            current: None,
            generation: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.current.is_some() {
            CaptureState::Recording
        } else {
            CaptureState::Idle
        }
    }

    pub fn jitter_threshold(&self) -> f32 {
        self.jitter_threshold
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin a stroke at `point`. Returns whether a pending quiet timer was
    /// cancelled by doing so.
    pub fn stroke_start(&mut self, point: Point) -> Result<bool, CaptureError> {
        if self.current.is_some() {
            return Err(CaptureError::StrokeInProgress);
        }
        let cancelled = self.cancel_timer();
        self.current = Some(Stroke::from_first_point(point));
        Ok(cancelled)
    }

    /// Append `point` to the current stroke unless it lies within the jitter
    /// threshold (Manhattan) of the last recorded point.
    pub fn stroke_extend(&mut self, point: Point) -> Result<bool, CaptureError> {
        let threshold = self.jitter_threshold;
        let stroke = self
            .current
            .as_mut()
            .ok_or(CaptureError::NoStrokeInProgress)?;
        if point.manhattan_distance(stroke.last()) <= threshold {
            return Ok(false);
        }
        stroke.push(point);
        Ok(true)
    }

    /// Canvas-style intake: the first move of a drag starts the stroke, the
    /// following ones extend it.
    pub fn pointer_moved(&mut self, point: Point) -> PointerOutcome {
        match self.stroke_start(point) {
            Ok(cancelled_timer) => PointerOutcome::Started { cancelled_timer },
            Err(_) => match self.stroke_extend(point) {
                Ok(true) => PointerOutcome::Appended,
                _ => PointerOutcome::Discarded,
            },
        }
    }

    /// Close the current stroke and arm the quiet timer.
    pub fn stroke_end(&mut self) -> Result<TimerTicket, CaptureError> {
        let stroke = self.current.take().ok_or(CaptureError::NoStrokeInProgress)?;
        self.strokes.push(stroke);
        self.generation += 1;
        let ticket = TimerTicket(self.generation);
        self.pending = Some(ticket);
        Ok(ticket)
    }

    pub fn cancel_timer(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Hand out the finished gesture if `ticket` is still the armed one.
    /// Stale tickets and tickets that raced with a new stroke yield `None`.
    pub fn quiet_timer_elapsed(&mut self, ticket: TimerTicket) -> Option<Gesture> {
        if self.pending != Some(ticket) || self.current.is_some() {
            return None;
        }
        self.pending = None;
        Some(self.take_gesture())
    }

    /// Finalize right away, closing any stroke still being drawn.
    pub fn finish(&mut self) -> Option<Gesture> {
        if let Some(stroke) = self.current.take() {
            self.strokes.push(stroke);
        }
        self.pending = None;
        if self.strokes.is_empty() {
            return None;
        }
        Some(self.take_gesture())
    }

    pub fn reset(&mut self) {
        self.strokes.clear();
        self.current = None;
        self.pending = None;
    }

    fn take_gesture(&mut self) -> Gesture {
        Gesture::new(std::mem::take(&mut self.strokes))
    }
}
