//! Custom tracing layer for JSONL output.
//!
//! Produces machine-parseable JSONL logs on stderr while keeping stdout
//! clean for command payloads. Correlation fields (`run_id`, `config_id`,
//! `stage`) are lifted from enclosing spans to the top level.

use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use super::events::Level;

#[derive(Debug, Clone, Default)]
struct SpanContext {
    run_id: Option<String>,
    config_id: Option<String>,
    stage: Option<String>,
}

impl SpanContext {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "run_id" => Some(&mut self.run_id),
            "config_id" => Some(&mut self.config_id),
            "stage" => Some(&mut self.stage),
            _ => None,
        }
    }

    /// Fill fields still unset from an outer span.
    fn inherit(&mut self, outer: &SpanContext) {
        self.run_id = self.run_id.take().or_else(|| outer.run_id.clone());
        self.config_id = self.config_id.take().or_else(|| outer.config_id.clone());
        self.stage = self.stage.take().or_else(|| outer.stage.clone());
    }
}

impl Visit for SpanContext {
    fn record_str(&mut self, field: &Field, value: &str) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if let Some(slot) = self.slot(field.name()) {
            *slot = Some(format!("{value:?}"));
        }
    }
}

/// Collects event fields; `message` is kept apart from the rest.
#[derive(Default)]
struct EventFields {
    fields: Map<String, Value>,
    message: Option<String>,
}

impl EventFields {
    fn put(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.put(field, Value::from(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // Non-finite floats have no JSON number form.
        let v = serde_json::Number::from_f64(value)
            .map_or_else(|| Value::from(value.to_string()), Value::Number);
        self.put(field, v);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }
}

/// JSONL tracing layer, stderr by default.
pub struct JsonlLayer<W = io::Stderr> {
    writer: Mutex<W>,
}

impl JsonlLayer<io::Stderr> {
    pub fn stderr() -> Self {
        JsonlLayer {
            writer: Mutex::new(io::stderr()),
        }
    }
}

impl<W: Write> JsonlLayer<W> {
    pub fn new(writer: W) -> Self {
        JsonlLayer {
            writer: Mutex::new(writer),
        }
    }
}

impl<S, W> Layer<S> for JsonlLayer<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: Write + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut context = SpanContext::default();
        attrs.record(&mut context);
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(context);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let ts = Utc::now();

        let mut fields = EventFields::default();
        event.record(&mut fields);

        // Event fields first, then spans from innermost outwards.
        let mut context = SpanContext::default();
        for key in ["run_id", "config_id", "stage"] {
            if let (Some(slot), Some(Value::String(v))) =
                (context.slot(key), fields.fields.remove(key))
            {
                *slot = Some(v);
            }
        }
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope {
                if let Some(outer) = span.extensions().get::<SpanContext>() {
                    context.inherit(outer);
                }
            }
        }

        let level: Level = (*event.metadata().level()).into();
        let mut line = Map::new();
        line.insert("ts".into(), Value::from(ts.to_rfc3339()));
        line.insert("level".into(), serde_json::json!(level));
        line.insert("event".into(), Value::from(event.metadata().target()));
        for (key, value) in [
            ("run_id", context.run_id),
            ("config_id", context.config_id),
            ("stage", context.stage),
            ("message", fields.message),
        ] {
            if let Some(value) = value {
                line.insert(key.into(), Value::from(value));
            }
        }
        if !fields.fields.is_empty() {
            line.insert("fields".into(), Value::Object(fields.fields));
        }

        let json = serde_json::to_string(&Value::Object(line)).unwrap_or_default();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{json}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<serde_json::Value> {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = JsonlLayer::new(BufWriter(buffer.clone()));
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let output = buffer.lock().unwrap();
        String::from_utf8_lossy(&output)
            .lines()
            .map(|l| serde_json::from_str(l).expect("valid JSON line"))
            .collect()
    }

    #[test]
    fn event_target_becomes_event_name() {
        let lines = capture(|| {
            tracing::info!(target: "interval.found", lower = 47.0, upper = 196.0, "found");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["event"], "interval.found");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["message"], "found");
        assert_eq!(lines[0]["fields"]["lower"], 47.0);
        assert!(lines[0]["ts"].is_string());
    }

    #[test]
    fn span_context_is_lifted() {
        let lines = capture(|| {
            let span = tracing::info_span!("run", run_id = "run-1", stage = "update");
            let _enter = span.enter();
            tracing::warn!(target: "posterior.updated", grid_points = 200u64, "updated");
        });
        assert_eq!(lines[0]["run_id"], "run-1");
        assert_eq!(lines[0]["stage"], "update");
        assert_eq!(lines[0]["level"], "warn");
        assert_eq!(lines[0]["fields"]["grid_points"], 200);
    }

    #[test]
    fn event_fields_override_span() {
        let lines = capture(|| {
            let span = tracing::info_span!("run", run_id = "run-1", stage = "init");
            let _enter = span.enter();
            tracing::info!(target: "interval.found", stage = "summarize", "done");
        });
        assert_eq!(lines[0]["stage"], "summarize");
        assert!(lines[0].get("fields").is_none());
    }

    #[test]
    fn non_finite_floats_stay_valid_json() {
        let lines = capture(|| {
            tracing::error!(target: "internal_error", value = f64::NAN, "bad");
        });
        assert_eq!(lines[0]["fields"]["value"], "NaN");
    }
}
