//! Translation of decoded records into input-sink events.

use crate::event::{DecodeError, EventKind, EventRecord};
use crate::keymap::{KeyCode, KeyMap};

/// Receiver for decoded input events.
///
/// The sink is expected to batch events until [`InputSink::sync`], which the
/// reporter emits exactly once per interrupt batch.
pub trait InputSink {
    fn key_event(&mut self, code: KeyCode, pressed: bool);
    /// Grip strength notification. Observational only; no key code attached.
    fn grip_event(&mut self, id: u8, pressed: bool, strength: u16);
    /// Marks the end of one event batch.
    fn sync(&mut self);
}

/// Routes one batch of decoded records to the sink, followed by one sync.
///
/// Record-level decode failures are logged and skipped; they never abort
/// the batch.
pub fn report_packets<S: InputSink>(
    records: impl Iterator<Item = Result<EventRecord, DecodeError>>,
    key_map: &KeyMap,
    sink: &mut S,
) {
    for record in records {
        match record {
            Ok(record) => report_one(record, key_map, sink),
            Err(err) => log::error!("dropping event record: {err}"),
        }
    }
    sink.sync();
}

fn report_one<S: InputSink>(record: EventRecord, key_map: &KeyMap, sink: &mut S) {
    match record.kind {
        EventKind::Key => {
            // The decoder bounds-checked the ID against this map's size.
            if let Some(code) = key_map.code_for(record.id) {
                log::debug!(
                    "key: id {} code {} pressed {} strength {}",
                    record.id,
                    code.0,
                    record.pressed,
                    record.strength
                );
                sink.key_event(code, record.pressed);
            }
        }
        EventKind::Grip => {
            log::debug!(
                "grip: id {} pressed {} strength {}",
                record.id,
                record.pressed,
                record.strength
            );
            sink.grip_event(record.id, record.pressed, record.strength);
        }
    }
}

/// Releases every configured key, then syncs.
///
/// Used when the device stream is known stale (resume, for instance) so no
/// key stays latched in the pressed state.
pub fn clear_keys<S: InputSink>(key_map: &KeyMap, sink: &mut S) {
    for &code in key_map.codes() {
        sink.key_event(code, false);
    }
    sink.sync();
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::{EventFormat, EventPackets};

    #[derive(Debug, PartialEq, Eq)]
    pub(crate) enum SinkCall {
        Key(KeyCode, bool),
        Grip(u8, bool, u16),
        Sync,
    }

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) calls: Vec<SinkCall>,
    }

    impl InputSink for RecordingSink {
        fn key_event(&mut self, code: KeyCode, pressed: bool) {
            self.calls.push(SinkCall::Key(code, pressed));
        }

        fn grip_event(&mut self, id: u8, pressed: bool, strength: u16) {
            self.calls.push(SinkCall::Grip(id, pressed, strength));
        }

        fn sync(&mut self) {
            self.calls.push(SinkCall::Sync);
        }
    }

    #[test]
    fn batch_ends_with_single_sync() {
        let key_map = KeyMap::default_layout();
        let buf = [0x81, 0x10, 0x02, 0x00, 0xC1, 0x42];
        let packets = EventPackets::new(&buf, EventFormat::Format4, 2, key_map.key_count());
        let mut sink = RecordingSink::default();

        report_packets(packets, &key_map, &mut sink);

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Key(crate::keymap::KEY_RECENT, true),
                SinkCall::Key(crate::keymap::KEY_BACK, false),
                SinkCall::Grip(1, true, 0x42),
                SinkCall::Sync,
            ]
        );
    }

    #[test]
    fn decode_errors_do_not_reach_the_sink() {
        let key_map = KeyMap::default_layout();
        // id 7 is out of range for a two-key map
        let buf = [0x87, 0x10, 0x81, 0x20];
        let packets = EventPackets::new(&buf, EventFormat::Format4, 2, key_map.key_count());
        let mut sink = RecordingSink::default();

        report_packets(packets, &key_map, &mut sink);

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Key(crate::keymap::KEY_RECENT, true),
                SinkCall::Sync,
            ]
        );
    }

    #[test]
    fn clear_keys_releases_every_key_then_syncs() {
        let key_map = KeyMap::default_layout();
        let mut sink = RecordingSink::default();

        clear_keys(&key_map, &mut sink);

        assert_eq!(
            sink.calls,
            vec![
                SinkCall::Key(crate::keymap::KEY_RECENT, false),
                SinkCall::Key(crate::keymap::KEY_BACK, false),
                SinkCall::Sync,
            ]
        );
    }
}
