//! The default log filter must let structured trace events through.

use std::io;
use std::sync::{Arc, Mutex};

use tm_domain::config::ObservabilityConfig;
use tm_domain::trace::TraceEvent;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn logged_with_default_filter(emit: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(ObservabilityConfig::default().filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        );
    tracing::subscriber::with_default(subscriber, emit);
    capture.text()
}

#[test]
fn trace_events_pass_default_filter() {
    let out = logged_with_default_filter(|| {
        TraceEvent::LegacyFallback {
            capability: "validate_code".into(),
            reason: "queue/join returned 404".into(),
        }
        .emit();
    });

    assert!(out.contains("tm_event"), "nothing logged: {out:?}");
    assert!(out.contains("LegacyFallback"), "{out}");
}

#[test]
fn debug_noise_stays_filtered() {
    let out = logged_with_default_filter(|| {
        tracing::debug!(target: "tm_rpc::client", "skipping event for another job");
    });
    assert!(out.is_empty(), "{out}");
}
