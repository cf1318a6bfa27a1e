use std::collections::HashMap;

use tracing::debug;

use crate::buttons::ButtonStates;
use crate::config::DecoderIds;
use crate::keypad::{decode_keypad, KEYPAD_MIN_LEN};
use crate::message::DecodedMessage;
use crate::torque_speed::{decode_torque_speed, TORQUE_SPEED_MIN_LEN};

/// Signature shared by all decoders.
///
/// Decoders receive the valid payload bytes only and must not assume more
/// than `min_len` of them.
pub type DecodeFn = fn(&[u8], &mut ButtonStates) -> Option<DecodedMessage>;

/// One registered decoder.
#[derive(Clone, Copy)]
pub struct DecoderEntry {
    pub id: u32,
    pub name: &'static str,
    pub min_len: usize,
    pub decode: DecodeFn,
}

impl std::fmt::Debug for DecoderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderEntry")
            .field("id", &format_args!("0x{:X}", self.id))
            .field("name", &self.name)
            .field("min_len", &self.min_len)
            .finish()
    }
}

/// Result of looking a frame up in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(DecodedMessage),
    /// No decoder is registered for the identifier.
    NotRecognized,
    /// A decoder exists but the payload is shorter than its minimum length.
    TooShort { min_len: usize, len: usize },
    /// The decoder ran and found nothing it could report.
    Rejected { decoder: &'static str },
}

/// Identifier-keyed decoder table.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    entries: HashMap<u32, DecoderEntry>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the keypad and torque/speed decoders.
    pub fn with_builtins(ids: DecoderIds) -> Self {
        let mut registry = Self::new();
        registry.register(DecoderEntry {
            id: ids.keypad_id,
            name: "keypad",
            min_len: KEYPAD_MIN_LEN,
            decode: decode_keypad,
        });
        registry.register(DecoderEntry {
            id: ids.control_id,
            name: "torque_speed",
            min_len: TORQUE_SPEED_MIN_LEN,
            decode: decode_torque_speed,
        });
        registry
    }

    /// Register a decoder, replacing any entry for the same identifier.
    pub fn register(&mut self, entry: DecoderEntry) -> Option<DecoderEntry> {
        debug!(id = entry.id, name = entry.name, "registering decoder");
        self.entries.insert(entry.id, entry)
    }

    /// Look up the entry for an identifier.
    pub fn get(&self, id: u32) -> Option<&DecoderEntry> {
        self.entries.get(&id)
    }

    /// Registered entries ordered by identifier.
    pub fn entries(&self) -> Vec<&DecoderEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }

    /// Decode `payload` for `id`.
    ///
    /// The decoder is never invoked when the payload is shorter than its
    /// minimum length.
    pub fn decode(&self, id: u32, payload: &[u8], states: &mut ButtonStates) -> DecodeOutcome {
        let Some(entry) = self.entries.get(&id) else {
            return DecodeOutcome::NotRecognized;
        };

        if payload.len() < entry.min_len {
            debug!(
                id,
                decoder = entry.name,
                len = payload.len(),
                min_len = entry.min_len,
                "payload too short; skipping decode"
            );
            return DecodeOutcome::TooShort {
                min_len: entry.min_len,
                len: payload.len(),
            };
        }

        match (entry.decode)(payload, states) {
            Some(message) => DecodeOutcome::Decoded(message),
            None => {
                debug!(id, decoder = entry.name, "decoder rejected payload");
                DecodeOutcome::Rejected {
                    decoder: entry.name,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CONTROL_ID, DEFAULT_KEYPAD_ID};
    use crate::message::TorqueSpeedRequest;

    fn registry() -> DecoderRegistry {
        DecoderRegistry::with_builtins(DecoderIds::default())
    }

    #[test]
    fn unknown_id_is_not_recognized() {
        let outcome = registry().decode(0x7FF, &[1, 2, 3], &mut ButtonStates::new());
        assert_eq!(outcome, DecodeOutcome::NotRecognized);
    }

    #[test]
    fn routes_to_torque_speed_decoder() {
        let outcome = registry().decode(
            DEFAULT_CONTROL_ID,
            &[0x00, 0x00, 0x08, 0x7D, 0x00],
            &mut ButtonStates::new(),
        );
        assert_eq!(
            outcome,
            DecodeOutcome::Decoded(DecodedMessage::TorqueSpeed(TorqueSpeedRequest {
                override_mode: 0,
                speed_rpm: 256.0,
                torque_percent: 0,
                priority: 0,
            }))
        );
    }

    fn panicking_decoder(_payload: &[u8], _states: &mut ButtonStates) -> Option<DecodedMessage> {
        panic!("decoder must not run on short payloads");
    }

    #[test]
    fn short_payload_never_invokes_decoder() {
        let mut registry = DecoderRegistry::new();
        registry.register(DecoderEntry {
            id: 0x42,
            name: "guarded",
            min_len: 6,
            decode: panicking_decoder,
        });

        let outcome = registry.decode(0x42, &[0; 5], &mut ButtonStates::new());
        assert_eq!(outcome, DecodeOutcome::TooShort { min_len: 6, len: 5 });
    }

    fn declining_decoder(_payload: &[u8], _states: &mut ButtonStates) -> Option<DecodedMessage> {
        None
    }

    #[test]
    fn decoder_returning_nothing_is_rejected_not_short() {
        let mut registry = DecoderRegistry::new();
        registry.register(DecoderEntry {
            id: 0x43,
            name: "declining",
            min_len: 2,
            decode: declining_decoder,
        });

        let outcome = registry.decode(0x43, &[0; 8], &mut ButtonStates::new());
        assert_eq!(outcome, DecodeOutcome::Rejected { decoder: "declining" });
    }

    #[test]
    fn short_keypad_payload_leaves_states_untouched() {
        let mut states = ButtonStates::new();
        let outcome = registry().decode(DEFAULT_KEYPAD_ID, &[0x01], &mut states);
        assert_eq!(outcome, DecodeOutcome::TooShort { min_len: 2, len: 1 });
        assert_eq!(states, ButtonStates::new());
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut registry = registry();
        let previous = registry.register(DecoderEntry {
            id: DEFAULT_KEYPAD_ID,
            name: "replacement",
            min_len: 1,
            decode: decode_keypad,
        });
        assert_eq!(previous.map(|e| e.name), Some("keypad"));
        assert_eq!(registry.get(DEFAULT_KEYPAD_ID).map(|e| e.name), Some("replacement"));
        assert_eq!(registry.entries().len(), 2);
    }

    #[test]
    fn custom_ids_move_builtins() {
        let registry = DecoderRegistry::with_builtins(DecoderIds {
            keypad_id: 0x1A0,
            control_id: 0x0C00_00FE,
        });
        assert!(registry.get(DEFAULT_KEYPAD_ID).is_none());
        let ids: Vec<u32> = registry.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![0x1A0, 0x0C00_00FE]);
    }
}
