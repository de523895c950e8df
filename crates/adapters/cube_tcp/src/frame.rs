//! Frame reader: turns a received chunk into decoded messages.
//!
//! A chunk is split on CR LF and each non-empty line is dispatched by its
//! tag. There is no reassembly across reads: a line cut in two by the
//! transport is decoded as two broken lines, and both are dropped.

use maxcube_app::hub_state::HubState;
use maxcube_app::ports::EventPublisher;
use maxcube_domain::event::CubeEvent;
use maxcube_domain::message::{Message, SendAck};

use crate::codec::{self, LINE_DELIMITER};
use crate::error::DecodeError;

/// Split a line into its tag and payload.
///
/// The character after the tag is a separator and is not checked.
fn split_line(line: &str) -> Option<(char, &str)> {
    let tag = line.chars().next()?;
    let payload = line.get(2..).unwrap_or_default();
    Some((tag, payload))
}

/// Decode one line.
///
/// Returns `Ok(None)` for tags the client does not understand.
///
/// # Errors
///
/// Returns [`DecodeError`] when a known tag carries a malformed payload.
pub fn decode_line(line: &str, state: &HubState) -> Result<Option<Message>, DecodeError> {
    let Some((tag, payload)) = split_line(line) else {
        return Ok(None);
    };
    let message = match tag {
        'H' => Message::Hello(codec::parse_hello(payload)?),
        'M' => Message::Metadata(codec::parse_metadata(payload)?),
        'C' => Message::DeviceConfig(codec::parse_device_config(payload)?),
        'L' => Message::DeviceList(codec::parse_device_list(payload, |address| {
            state.registry().device_type(address)
        })?),
        'S' => Message::SendAck(codec::parse_send_ack(payload)?),
        other => {
            tracing::debug!(tag = %other, "unknown message type");
            return Ok(None);
        }
    };
    tracing::debug!(tag = %tag, "message decoded");
    Ok(Some(message))
}

/// Decode and apply every line of `chunk`, then publish one `update` event.
///
/// Malformed lines are logged and skipped. Acknowledgments found in the chunk
/// are returned in arrival order.
pub fn process_chunk(
    chunk: &[u8],
    state: &mut HubState,
    events: &impl EventPublisher,
) -> Vec<SendAck> {
    let text = String::from_utf8_lossy(chunk);
    tracing::trace!(bytes = chunk.len(), "chunk received");

    let mut acks = Vec::new();
    for line in text.split(LINE_DELIMITER).filter(|line| !line.is_empty()) {
        match decode_line(line, state) {
            Ok(Some(message)) => {
                if let Some(ack) = state.apply(message, events) {
                    acks.push(ack);
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, line, "dropping malformed line");
            }
        }
    }

    events.publish(CubeEvent::Update(state.snapshot()));
    acks
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;

    use super::*;
    use maxcube_domain::address::RfAddress;
    use maxcube_domain::device::{Mode, WindowState};

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<CubeEvent>>,
    }

    impl RecordingPublisher {
        fn kinds(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(CubeEvent::kind).collect()
        }

        fn last_update(&self) -> Option<std::sync::Arc<maxcube_domain::registry::Registry>> {
            self.events.lock().unwrap().iter().rev().find_map(|event| match event {
                CubeEvent::Update(registry) => Some(registry.clone()),
                _ => None,
            })
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: CubeEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn metadata_line() -> String {
        let mut blob = vec![0x56, 0x02, 1, 1, 6];
        blob.extend(b"Office");
        blob.extend([0x0a, 0x0b, 0x0c]);
        blob.push(2);
        blob.push(1);
        blob.extend([0x01, 0x02, 0x03]);
        blob.extend(b"KEQ00001");
        blob.extend([0, 0, 3]);
        blob.extend(b"Rad");
        blob.push(1);
        blob.push(4);
        blob.extend([0x04, 0x05, 0x06]);
        blob.extend(b"KEQ00002");
        blob.extend([0, 0, 3]);
        blob.extend(b"Win");
        blob.push(1);
        format!("M:00,01,{}\r\n", STANDARD.encode(blob))
    }

    fn list_line() -> String {
        let mut blob = vec![11, 0x01, 0x02, 0x03, 0x00, 0x12, 0x19, 30, 42, 0x00, 0xd2, 0x00];
        blob.extend([6, 0x04, 0x05, 0x06, 0x00, 0x12, 0x02]);
        format!("L:{}\r\n", STANDARD.encode(blob))
    }

    #[test]
    fn should_fill_registry_from_one_chunk() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();
        let chunk = format!(
            "H:KEQ0000001,0b0c0d,0113,00000000,477719c0,05,32,100a0d,0b2a,03,0000\r\n{}{}",
            metadata_line(),
            list_line()
        );

        let acks = process_chunk(chunk.as_bytes(), &mut state, &events);

        assert!(acks.is_empty());
        assert_eq!(events.kinds(), ["status", "update"]);
        let registry = events.last_update().unwrap();
        assert_eq!(registry.rooms().len(), 1);
        assert_eq!(registry.device_count(), 2);
        let radiator = registry.device(&RfAddress::new([1, 2, 3])).unwrap();
        assert_eq!(radiator.valve, Some(30));
        assert_eq!(radiator.mode, Some(Mode::Manual));
        assert_eq!(radiator.actual_temperature, Some(21.0));
        let window = registry.device(&RfAddress::new([4, 5, 6])).unwrap();
        assert_eq!(window.state, Some(WindowState::Open));
        assert!(registry.window_open_in_room(1));
    }

    #[test]
    fn should_give_same_registry_when_list_repeats() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();
        process_chunk(metadata_line().as_bytes(), &mut state, &events);
        process_chunk(list_line().as_bytes(), &mut state, &events);
        let first = state.registry().clone();

        process_chunk(list_line().as_bytes(), &mut state, &events);

        assert_eq!(state.registry(), &first);
    }

    #[test]
    fn should_return_acks_and_publish_response() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();

        let acks = process_chunk(b"S:00,0,31\r\n", &mut state, &events);

        assert_eq!(acks.len(), 1);
        assert!(acks[0].accepted);
        assert_eq!(events.kinds(), ["status", "response", "update"]);
    }

    #[test]
    fn should_skip_unknown_and_malformed_lines() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();

        let acks = process_chunk(b"X:whatever\r\nS:zz,0\r\n\r\nS:01,1,00\r\n", &mut state, &events);

        assert_eq!(acks.len(), 1);
        assert!(!acks[0].accepted);
        assert_eq!(events.kinds(), ["status", "response", "update"]);
    }

    #[test]
    fn should_publish_update_for_empty_chunk() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();

        process_chunk(b"", &mut state, &events);

        assert_eq!(events.kinds(), ["update"]);
    }

    #[test]
    fn should_drop_line_split_across_chunks() {
        let events = RecordingPublisher::default();
        let mut state = HubState::new();
        let line = metadata_line();
        let (head, tail) = line.split_at(line.len() / 2);

        process_chunk(head.as_bytes(), &mut state, &events);
        process_chunk(tail.as_bytes(), &mut state, &events);

        assert!(state.registry().is_empty());
    }

    #[test]
    fn should_not_validate_separator() {
        let state = HubState::new();
        let message = decode_line("S-00,0,10", &state).unwrap();
        assert!(matches!(message, Some(Message::SendAck(_))));
        assert!(decode_line("S", &state).is_err());
    }
}
