use crate::settings::Settings;
use crate::strokes::capture::{CaptureError, CaptureSession, PointerOutcome, TimerTicket};
use crate::strokes::geometry::Point;
use crate::strokes::library::TemplateLibrary;
use crate::strokes::matcher::{MatchReport, Matcher};
use crate::strokes::model::{Gesture, ShapeSignature};
use crate::strokes::timer::QuietTimer;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What happens to a gesture once the quiet timer elapses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureMode {
    /// Score it against the template library.
    #[default]
    Match,
    /// Store it as the template of `widget_key`.
    Record { widget_key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Evaluated {
        gesture: Gesture,
        report: MatchReport,
    },
    TemplateSaved {
        widget_key: String,
        signature: ShapeSignature,
    },
    TemplateSaveFailed {
        widget_key: String,
        error: String,
    },
}

/// Receives finalized gestures. Called from the quiet timer thread.
pub trait GestureEventSink: Send + Sync {
    fn dispatch(&self, event: GestureEvent);
}

struct Shared {
    session: Mutex<CaptureSession>,
    mode: Mutex<CaptureMode>,
    library: Arc<TemplateLibrary>,
    matcher: Matcher,
    sink: Arc<dyn GestureEventSink>,
    recording_origin: f32,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, CaptureSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mode(&self) -> MutexGuard<'_, CaptureMode> {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_quiet_timer(&self, ticket: TimerTicket) {
        let gesture = self.session().quiet_timer_elapsed(ticket);
        match gesture {
            Some(gesture) => {
                let event = self.process(gesture);
                self.sink.dispatch(event);
            }
            None => tracing::debug!(
                generation = ticket.generation(),
                "stale quiet timer ignored"
            ),
        }
    }

    fn process(&self, gesture: Gesture) -> GestureEvent {
        let mode = self.mode().clone();
        match mode {
            CaptureMode::Match => {
                let report = {
                    let index = self.library.index();
                    self.matcher.evaluate(&gesture, &index)
                };
                GestureEvent::Evaluated { gesture, report }
            }
            CaptureMode::Record { widget_key } => {
                let centred = gesture.translated(-self.recording_origin, -self.recording_origin);
                match self.library.save(&widget_key, &centred) {
                    Ok(signature) => GestureEvent::TemplateSaved {
                        widget_key,
                        signature,
                    },
                    Err(err) => GestureEvent::TemplateSaveFailed {
                        widget_key,
                        error: err.to_string(),
                    },
                }
            }
        }
    }
}

/// Pointer intake for one drawing surface.
///
/// Strokes accumulate until the quiet timer elapses after the last release;
/// the gesture is then matched or recorded according to the current
/// [`CaptureMode`] and handed to the sink.
pub struct GestureService {
    shared: Arc<Shared>,
    timer: QuietTimer,
    quiet_timer: Duration,
    recording_quiet_timer: Duration,
}

impl GestureService {
    pub fn new(
        settings: &Settings,
        library: Arc<TemplateLibrary>,
        sink: Arc<dyn GestureEventSink>,
    ) -> Self {
        let shared = Arc::new(Shared {
            session: Mutex::new(CaptureSession::new(settings.jitter_threshold)),
            mode: Mutex::new(CaptureMode::Match),
            library,
            matcher: settings.matcher(),
            sink,
            recording_origin: settings.recording_canvas_size / 2.0,
        });
        let weak = Arc::downgrade(&shared);
        let timer = QuietTimer::spawn(move |ticket| {
            if let Some(shared) = weak.upgrade() {
                shared.on_quiet_timer(ticket);
            }
        });
        Self {
            shared,
            timer,
            quiet_timer: settings.quiet_timer(),
            recording_quiet_timer: settings.recording_quiet_timer(),
        }
    }

    pub fn library(&self) -> &Arc<TemplateLibrary> {
        &self.shared.library
    }

    pub fn mode(&self) -> CaptureMode {
        self.shared.mode().clone()
    }

    /// Switch between matching and recording. Strokes already drawn are
    /// discarded.
    pub fn set_mode(&self, mode: CaptureMode) {
        let mut session = self.shared.session();
        session.reset();
        self.timer.cancel();
        tracing::debug!(?mode, "capture mode changed");
        *self.shared.mode() = mode;
    }

    pub fn stroke_start(&self, point: Point) {
        let mut session = self.shared.session();
        match session.stroke_start(point) {
            Ok(true) => self.timer.cancel(),
            Ok(false) => {}
            Err(err) => log_stray(err, "stroke_start"),
        }
    }

    pub fn stroke_extend(&self, point: Point) {
        if let Err(err) = self.shared.session().stroke_extend(point) {
            log_stray(err, "stroke_extend");
        }
    }

    /// Move with the button held: starts a stroke if none is open.
    pub fn pointer_moved(&self, point: Point) {
        let mut session = self.shared.session();
        if let PointerOutcome::Started {
            cancelled_timer: true,
        } = session.pointer_moved(point)
        {
            self.timer.cancel();
        }
    }

    pub fn stroke_end(&self) {
        let mut session = self.shared.session();
        match session.stroke_end() {
            Ok(ticket) => self.timer.arm(ticket, self.current_delay()),
            Err(err) => log_stray(err, "stroke_end"),
        }
    }

    /// Finalize immediately instead of waiting for the quiet timer. The
    /// event is dispatched to the sink and returned.
    pub fn finish_now(&self) -> Option<GestureEvent> {
        let gesture = {
            let mut session = self.shared.session();
            self.timer.cancel();
            session.finish()?
        };
        let event = self.shared.process(gesture);
        self.shared.sink.dispatch(event.clone());
        Some(event)
    }

    /// Strokes recorded so far in the current gesture.
    pub fn pending_strokes(&self) -> usize {
        let session = self.shared.session();
        session.strokes().len() + usize::from(session.current_stroke().is_some())
    }

    fn current_delay(&self) -> Duration {
        match *self.shared.mode() {
            CaptureMode::Match => self.quiet_timer,
            CaptureMode::Record { .. } => self.recording_quiet_timer,
        }
    }
}

fn log_stray(err: CaptureError, event: &'static str) {
    tracing::debug!(%err, event, "ignoring out-of-order pointer event");
}
