use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};

use canbridge_decode::{ButtonStates, DecodeOutcome, DecodedMessage, DecoderRegistry};
use canbridge_frame::{format_hex, Frame};
use canbridge_link::LinkError;
use serde::Serialize;
use tracing::{debug, warn};

/// Receives every frame the router reads, and every forwarding outcome.
///
/// Implementations must not fail the caller.
pub trait FrameObserver {
    /// Called once per received frame, before any forwarding.
    fn observe(&mut self, source: &str, frame: &Frame);

    /// Called once per destination a frame was forwarded to.
    fn forwarded(&mut self, source: &str, destination: &str, outcome: Result<(), &LinkError>);
}

/// Output encoding of observer lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObserverFormat {
    /// `[RX canfd1] ID=0x195 DLC=2 Data: 01 00`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ObserverEvent<'a> {
    Frame {
        link: &'a str,
        id: u32,
        extended: bool,
        remote: bool,
        dlc: usize,
        data: String,
    },
    Decoded {
        link: &'a str,
        id: u32,
        decoded: &'a DecodedMessage,
    },
    Forward {
        source: &'a str,
        destination: &'a str,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Prints raw and decoded frame lines to a writer (stdout in the daemon).
///
/// Owns the keypad [`ButtonStates`] for the life of the process.
pub struct ConsoleObserver<W> {
    out: W,
    format: ObserverFormat,
    registry: DecoderRegistry,
    buttons: ButtonStates,
}

impl<W: Write> ConsoleObserver<W> {
    pub fn new(out: W, format: ObserverFormat, registry: DecoderRegistry) -> Self {
        Self {
            out,
            format,
            registry,
            buttons: ButtonStates::new(),
        }
    }

    /// Current keypad state.
    pub fn buttons(&self) -> &ButtonStates {
        &self.buttons
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn decode(&mut self, frame: &Frame) -> Option<DecodedMessage> {
        if frame.is_error() || frame.is_remote() {
            return None;
        }

        let registry = &self.registry;
        let buttons = &mut self.buttons;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            registry.decode(frame.id(), frame.data(), buttons)
        }));

        match outcome {
            Ok(DecodeOutcome::Decoded(message)) => Some(message),
            Ok(DecodeOutcome::NotRecognized)
            | Ok(DecodeOutcome::TooShort { .. })
            | Ok(DecodeOutcome::Rejected { .. }) => None,
            Err(_) => {
                warn!(id = frame.id(), "decoder panicked; frame logged raw only");
                None
            }
        }
    }

    fn emit(&mut self, text: std::fmt::Arguments<'_>, event: &ObserverEvent<'_>) {
        let result = match self.format {
            ObserverFormat::Text => writeln!(self.out, "{text}"),
            ObserverFormat::Json => match serde_json::to_string(event) {
                Ok(line) => writeln!(self.out, "{line}"),
                Err(err) => {
                    debug!(error = %err, "failed to serialize observer event");
                    return;
                }
            },
        };
        if let Err(err) = result.and_then(|()| self.out.flush()) {
            debug!(error = %err, "failed to write observer line");
        }
    }
}

impl<W: Write> FrameObserver for ConsoleObserver<W> {
    fn observe(&mut self, source: &str, frame: &Frame) {
        let data = format_hex(frame.data());
        self.emit(
            format_args!(
                "[RX {source}] ID=0x{:03X} DLC={} Data: {data}",
                frame.id(),
                frame.len()
            ),
            &ObserverEvent::Frame {
                link: source,
                id: frame.id(),
                extended: frame.is_extended(),
                remote: frame.is_remote(),
                dlc: frame.len(),
                data: data.clone(),
            },
        );

        if let Some(message) = self.decode(frame) {
            self.emit(
                format_args!("    {message}"),
                &ObserverEvent::Decoded {
                    link: source,
                    id: frame.id(),
                    decoded: &message,
                },
            );
        }
    }

    fn forwarded(&mut self, source: &str, destination: &str, outcome: Result<(), &LinkError>) {
        match outcome {
            Ok(()) => self.emit(
                format_args!("    -> Forwarded to {destination}"),
                &ObserverEvent::Forward {
                    source,
                    destination,
                    ok: true,
                    error: None,
                },
            ),
            Err(err) => self.emit(
                format_args!("    -> Error forwarding to {destination}: {err}"),
                &ObserverEvent::Forward {
                    source,
                    destination,
                    ok: false,
                    error: Some(err.to_string()),
                },
            ),
        }
    }
}
