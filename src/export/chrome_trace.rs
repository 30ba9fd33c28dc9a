//! Chrome Trace Event Format export
//!
//! Converts a results bundle into the JSON consumed by Perfetto, Speedscope
//! and `chrome://tracing`. Every recorded event becomes a complete (`"X"`)
//! event on its thread's track, frames land on a dedicated synthetic track,
//! and thread names are emitted as metadata (`"M"`) events.
//! Spec: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU/preview

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::io::Write;

use crate::domain::{ExportError, Tag, ThreadId};
use crate::trace_data::ProfilerResults;

#[derive(Debug, Clone, Serialize)]
struct ChromeTraceEvent {
    /// Event name (scope name, frame label or "thread_name")
    name: String,
    /// Category for filtering/coloring
    cat: String,
    /// Phase: "X" = complete, "M" = metadata
    ph: String,
    /// Timestamp in microseconds
    ts: f64,
    /// Duration in microseconds, complete events only
    #[serde(skip_serializing_if = "Option::is_none")]
    dur: Option<f64>,
    pid: u32,
    tid: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<HashMap<String, JsonValue>>,
}

#[derive(Debug, Serialize)]
struct ChromeTrace {
    #[serde(rename = "traceEvents")]
    trace_events: Vec<ChromeTraceEvent>,
    #[serde(rename = "displayTimeUnit")]
    display_time_unit: String,
}

/// Chrome trace exporter for timeline visualization
pub struct ChromeTraceExporter {
    events: Vec<ChromeTraceEvent>,
}

fn us(ns: i64) -> f64 {
    ns as f64 / 1_000.0
}

impl ChromeTraceExporter {
    /// Builds the trace from a results bundle.
    pub fn from_results(results: &ProfilerResults) -> Self {
        let pid = std::process::id();
        let mut events = Vec::new();

        for index in 0..results.thread_count() {
            let tid = index as u32;
            events.push(thread_name_event(pid, tid, results.thread_name(ThreadId(index))));

            for event in results.events(ThreadId(index)) {
                let (name, tag) = match results.scopes().get(&event.key) {
                    Some(scope) => (scope.name.clone(), scope.tag),
                    None => (event.key.to_string(), Tag::NONE),
                };

                let mut args = HashMap::new();
                args.insert("depth".to_string(), serde_json::json!(event.depth));
                if let Some(scope) = results.scopes().get(&event.key) {
                    args.insert("function".to_string(), serde_json::json!(scope.function));
                    args.insert(
                        "location".to_string(),
                        serde_json::json!(format!("{}:{}", scope.file, scope.line)),
                    );
                }
                if let Some(entry) = results.tags().get(tag.0 as usize) {
                    args.insert("tag".to_string(), serde_json::json!(entry.name));
                }
                if let Some(cookie) = event.cookie {
                    args.insert("cookie".to_string(), serde_json::json!(cookie));
                }

                events.push(ChromeTraceEvent {
                    name,
                    cat: "scope".to_string(),
                    ph: "X".to_string(),
                    ts: us(event.start_ns),
                    dur: Some(us(event.duration_ns())),
                    pid,
                    tid,
                    args: Some(args),
                });
            }
        }

        // Frames go on their own track after the real threads.
        let frame_tid = results.thread_count() as u32;
        events.push(thread_name_event(pid, frame_tid, "Frames"));
        for frame in results.frames() {
            events.push(ChromeTraceEvent {
                name: format!("frame {}", frame.number),
                cat: "frame".to_string(),
                ph: "X".to_string(),
                ts: us(frame.start_ns),
                dur: Some(us(frame.duration_ns())),
                pid,
                tid: frame_tid,
                args: None,
            });
        }

        Self { events }
    }

    /// Export the trace to any writer (file, stdout, buffer, etc.)
    pub fn export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let trace = ChromeTrace {
            trace_events: self.events.clone(),
            display_time_unit: "ms".to_string(),
        };
        serde_json::to_writer_pretty(writer, &trace)?;
        Ok(())
    }

    /// Get the number of events collected
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

fn thread_name_event(pid: u32, tid: u32, name: &str) -> ChromeTraceEvent {
    let mut args = HashMap::new();
    args.insert("name".to_string(), serde_json::json!(name));
    ChromeTraceEvent {
        name: "thread_name".to_string(),
        cat: String::new(),
        ph: "M".to_string(),
        ts: 0.0,
        dur: None,
        pid,
        tid,
        args: Some(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FrameData, RecordedEvent, ScopeInfo, ScopeKey, TagColor, TagEntry};
    use std::collections::VecDeque;

    fn sample_results() -> ProfilerResults {
        let key = ScopeKey(9);
        let mut scopes = std::collections::HashMap::new();
        scopes.insert(
            key,
            ScopeInfo {
                key,
                tag: Tag::NONE,
                name: "step".to_string(),
                function: "world::step".to_string(),
                file: "world.rs".to_string(),
                line: 10,
            },
        );

        let mut frames = VecDeque::new();
        frames.push_back(FrameData { number: 1, start_ns: 0, end_ns: 5_000_000 });

        let mut queue = VecDeque::new();
        queue.push_back(RecordedEvent {
            key,
            depth: 0,
            start_ns: 1_000_000,
            end_ns: 2_000_000,
            cookie: None,
        });

        ProfilerResults {
            frames,
            scopes,
            tags: vec![TagEntry { name: "Untagged".to_string(), color: TagColor::WHITE }],
            events: vec![queue],
            thread_names: vec!["Main".to_string()],
            frame_data_missing: false,
            any_records: true,
            with_cookie: false,
        }
    }

    #[test]
    fn export_creates_valid_json() {
        let exporter = ChromeTraceExporter::from_results(&sample_results());
        let mut buffer = Vec::new();

        exporter.export(&mut buffer).expect("failed to export trace");

        let json_str = String::from_utf8(buffer).expect("invalid UTF-8");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("invalid JSON");

        assert!(parsed.get("traceEvents").is_some());
        assert_eq!(parsed["displayTimeUnit"], "ms");
    }

    #[test]
    fn counts_scope_frame_and_metadata_events() {
        let exporter = ChromeTraceExporter::from_results(&sample_results());
        // one scope event + one frame event + two thread_name metadata events
        assert_eq!(exporter.event_count(), 4);
    }

    #[test]
    fn scope_events_are_complete_events_in_microseconds() {
        let exporter = ChromeTraceExporter::from_results(&sample_results());
        let scope = exporter
            .events
            .iter()
            .find(|event| event.cat == "scope")
            .expect("scope event present");

        assert_eq!(scope.ph, "X");
        assert_eq!(scope.ts, 1_000.0);
        assert_eq!(scope.dur, Some(1_000.0));
    }
}
