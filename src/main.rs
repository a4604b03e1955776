use anyhow::{anyhow, bail, Context};
use std::sync::Arc;
use widget_sketch::settings::{Settings, SETTINGS_FILE};
use widget_sketch::strokes::{
    CaptureMode, GestureEvent, GestureEventSink, GestureService, Point, TemplateLibrary,
};

const USAGE: &str = "usage: widget_sketch <list | show KEY | record KEY FILE | match FILE | remove KEY>
FILE holds a JSON array of strokes, each an array of [x, y] pairs.";

struct LogSink;

impl GestureEventSink for LogSink {
    fn dispatch(&self, event: GestureEvent) {
        tracing::debug!(?event, "gesture event");
    }
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    widget_sketch::logging::init(settings.debug_logging, settings.log_file.clone());

    let args: Vec<String> = std::env::args().skip(1).collect();
    let library = Arc::new(TemplateLibrary::open(settings.resolve_strokes_dir()));

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["list"] => {
            let index = library.index();
            for key in index.keys() {
                let signature = index
                    .signature_of(&key)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!("{key}\t{signature}");
            }
        }
        ["show", key] => {
            let gesture = library
                .try_load(key)?
                .ok_or_else(|| anyhow!("no template recorded for {key}"))?;
            println!("{}", serde_json::to_string_pretty(&gesture.to_coords())?);
        }
        ["record", key, file] => {
            let service = GestureService::new(&settings, Arc::clone(&library), Arc::new(LogSink));
            service.set_mode(CaptureMode::Record {
                widget_key: key.to_string(),
            });
            match replay(&service, file)? {
                GestureEvent::TemplateSaved {
                    widget_key,
                    signature,
                } => println!("saved {widget_key} ({signature})"),
                GestureEvent::TemplateSaveFailed { error, .. } => bail!(error),
                GestureEvent::Evaluated { .. } => {}
            }
        }
        ["match", file] => {
            let service = GestureService::new(&settings, Arc::clone(&library), Arc::new(LogSink));
            if let GestureEvent::Evaluated { report, .. } = replay(&service, file)? {
                println!("{}: {}", report.status, report.explanation());
                for result in &report.ranked {
                    println!("{:>10.2}\t{}", result.distance, result.widget_key);
                }
                if report.should_prompt(settings.prompt_for_widget) {
                    println!("confirm the widget before placing it");
                }
            }
        }
        ["remove", key] => {
            if library.remove(key)? {
                println!("removed {key}");
            } else {
                println!("no template recorded for {key}");
            }
        }
        _ => bail!(USAGE),
    }
    Ok(())
}

/// Feed the strokes of `file` through the capture pipeline and finalize.
fn replay(service: &GestureService, file: &str) -> anyhow::Result<GestureEvent> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("read gesture file {file}"))?;
    let strokes: Vec<Vec<(f32, f32)>> =
        serde_json::from_str(&content).with_context(|| format!("parse gesture file {file}"))?;

    for stroke in strokes {
        let mut points = stroke.into_iter().map(Point::from);
        let Some(first) = points.next() else {
            tracing::warn!("skipping empty stroke in {file}");
            continue;
        };
        service.stroke_start(first);
        for point in points {
            service.stroke_extend(point);
        }
        service.stroke_end();
    }

    service
        .finish_now()
        .ok_or_else(|| anyhow!("{file} contains no strokes"))
}
