//! Log output for the `venue-scout` binary.
//!
//! Stdout carries the ranking, prompts and results the operator reads.
//! Every log line, text or JSON, goes to stderr so the two never mix.
//! `RUST_LOG` overrides the level chosen on the command line.

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber writing to stderr. A second call is a
/// no-op.
pub fn init_tracing(json: bool, level: Level) {
    if subscriber(json, level, io::stderr).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync + 'static>;

fn subscriber<W>(json: bool, level: Level, writer: W) -> BoxedSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(writer);

    if json {
        Box::new(tracing_subscriber::registry().with(filter).with(layer.json()))
    } else {
        Box::new(tracing_subscriber::registry().with(filter).with(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'w> MakeWriter<'w> for Captured {
        type Writer = Captured;

        fn make_writer(&'w self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::INFO);
        init_tracing(true, Level::DEBUG);
    }

    #[test]
    fn test_json_lines_go_to_the_given_writer() {
        let sink = Captured::default();
        let json = subscriber(true, Level::INFO, sink.clone());

        tracing::subscriber::with_default(json, || {
            tracing::info!(event = "merge.completed", ranked = 2, "merge completed");
        });

        let out = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["fields"]["event"], "merge.completed");
        assert_eq!(line["fields"]["ranked"], 2);
    }
}
