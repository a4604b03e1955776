pub mod capture;
pub mod geometry;
pub mod index;
pub mod library;
pub mod matcher;
pub mod model;
pub mod service;
pub mod store;
pub mod timer;

pub use capture::{CaptureError, CaptureSession, CaptureState, PointerOutcome, TimerTicket};
pub use geometry::{BoundingBox, GeometryError, Orientation, Point};
pub use library::{TemplateError, TemplateLibrary, KNOWN_WIDGET_KEYS};
pub use matcher::{MatchReport, MatchResult, MatchStatus, Matcher};
pub use model::{Gesture, ShapeSignature, Stroke};
pub use service::{CaptureMode, GestureEvent, GestureEventSink, GestureService};
