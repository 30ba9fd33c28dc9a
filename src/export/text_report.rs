//! Human-readable report: per thread, frame by frame, scopes indented by
//! call depth. Events that started before the first recorded frame or after
//! the last one are skipped with a note.

use std::fmt::Write as _;

use crate::domain::{FrameData, RecordedEvent};
use crate::trace_data::ProfilerResults;

/// Unit used for durations in the text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationUnit {
    #[default]
    Millis,
    Micros,
    Nanos,
}

impl DurationUnit {
    pub fn label(self) -> &'static str {
        match self {
            DurationUnit::Millis => "ms",
            DurationUnit::Micros => "us",
            DurationUnit::Nanos => "ns",
        }
    }

    fn format(self, ns: i64) -> String {
        match self {
            DurationUnit::Millis => format!("{:.3}", ns as f64 / 1_000_000.0),
            DurationUnit::Micros => format!("{:.3}", ns as f64 / 1_000.0),
            DurationUnit::Nanos => format!("{ns}"),
        }
    }
}

pub(crate) fn render(results: &ProfilerResults, unit: DurationUnit) -> String {
    let frames = results.frames();
    debug_assert!(!frames.is_empty(), "every bundle carries at least one frame");

    let mut out = String::new();
    for (index, name) in results.thread_names.iter().enumerate() {
        let events = &results.events[index];
        let _ = writeln!(out, "THREAD: {name}; Event count: {}", events.len());

        let last_frame = frames.len() - 1;
        let mut frame_index = 0;
        write_frame_line(&mut out, &frames[frame_index], unit);

        for event in events {
            if event.start_ns < frames[frame_index].start_ns {
                let _ = writeln!(out, "Skipped early event");
                continue;
            } else if event.start_ns > frames[frame_index].end_ns && frame_index == last_frame {
                let _ = writeln!(out, "Skipped late event");
                continue;
            } else if event.start_ns > frames[frame_index].end_ns {
                while event.start_ns > frames[frame_index].end_ns && frame_index != last_frame {
                    frame_index += 1;
                }
                write_frame_line(&mut out, &frames[frame_index], unit);
            }

            write_event_line(&mut out, results, event, unit);
        }
    }

    out
}

fn write_frame_line(out: &mut String, frame: &FrameData, unit: DurationUnit) {
    let _ = writeln!(
        out,
        "  FRAME: {}; Duration: {}{}",
        frame.number,
        unit.format(frame.duration_ns()),
        unit.label()
    );
}

fn write_event_line(
    out: &mut String,
    results: &ProfilerResults,
    event: &RecordedEvent,
    unit: DurationUnit,
) {
    let (name, function) = match results.scopes.get(&event.key) {
        Some(scope) => (scope.name.as_str(), scope.function.as_str()),
        None => {
            debug_assert!(false, "event references a scope missing from the bundle");
            (("<unknown>"), "<unknown>")
        }
    };

    let offset = (event.depth * 2 + 4).max(0) as usize;
    let _ = write!(out, "{:offset$}SCOPE: {name}", "");
    if results.with_cookie {
        if let Some(cookie) = event.cookie {
            let _ = write!(out, "; Cookie: {cookie}");
        }
    }
    let _ = writeln!(
        out,
        "; Function: {function}; Duration: {}{}",
        unit.format(event.duration_ns()),
        unit.label()
    );
}
