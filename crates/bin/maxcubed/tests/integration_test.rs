//! End-to-end smoke tests for the full maxcubed stack.
//!
//! Each test starts a fake cube on a local port, points a real
//! `CubeClient` at it and consumes the client's events the way the daemon
//! does: as a `BroadcastStream`.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tokio::net::TcpListener;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::BroadcastStream;

use maxcube_adapter_tcp::{CubeClient, CubeConfig};
use maxcube_domain::address::RfAddress;
use maxcube_domain::device::Mode;
use maxcube_domain::event::CubeEvent;

const WAIT: Duration = Duration::from_secs(5);

fn announcement() -> String {
    let mut metadata = vec![0x56, 0x02, 1, 3, 7];
    metadata.extend(b"Kitchen");
    metadata.extend([0x00, 0x00, 0x03]);
    metadata.push(1);
    metadata.push(2);
    metadata.extend([0x0a, 0x1b, 0x2c]);
    metadata.extend(b"MEQ12345");
    metadata.extend([0, 0, 4]);
    metadata.extend(b"Heat");
    metadata.push(3);

    let list = [11, 0x0a, 0x1b, 0x2c, 0x00, 0x12, 0x19, 55, 44, 0x00, 0xc8, 0x00];

    format!(
        "H:MEQ0000001,00aabb,0113,00000000,11223344,03,32,110101,0c00\r\nM:00,01,{}\r\nL:{}\r\n",
        STANDARD.encode(metadata),
        STANDARD.encode(list)
    )
}

async fn next_kind(stream: &mut BroadcastStream<CubeEvent>, kind: &str) -> CubeEvent {
    tokio::time::timeout(WAIT, async {
        while let Some(event) = stream.next().await {
            let event = event.unwrap();
            if event.kind() == kind {
                return event;
            }
        }
        panic!("event stream ended before a {kind} event");
    })
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_expose_discovered_house_as_json() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = CubeClient::connect(CubeConfig {
        port: listener.local_addr().unwrap().port(),
        ..CubeConfig::new("127.0.0.1")
    });
    let mut stream = BroadcastStream::new(client.subscribe());

    let (mut socket, _) = listener.accept().await.unwrap();
    next_kind(&mut stream, "connected").await;
    socket.write_all(announcement().as_bytes()).await.unwrap();

    let CubeEvent::Update(registry) = next_kind(&mut stream, "update").await else {
        unreachable!();
    };
    let json = serde_json::to_value(&*registry).unwrap();

    assert_eq!(json["rooms"][0]["name"], "Kitchen");
    assert_eq!(json["rooms"][0]["group_address"], "000003");
    let heater = &json["devices"]["0a1b2c"];
    assert_eq!(heater["name"], "Heat");
    assert_eq!(heater["room_id"], 3);
    assert_eq!(heater["valve"], 55);
    assert_eq!(heater["setpoint"], 22.0);
    assert_eq!(heater["actual_temperature"], 20.0);
    assert_eq!(heater["mode"], "manual");

    client.shutdown().await;
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_set_temperature_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = CubeClient::connect(CubeConfig {
        port: listener.local_addr().unwrap().port(),
        ..CubeConfig::new("127.0.0.1")
    });
    let mut stream = BroadcastStream::new(client.subscribe());

    let (socket, _) = listener.accept().await.unwrap();
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    next_kind(&mut stream, "connected").await;
    writer.write_all(announcement().as_bytes()).await.unwrap();
    next_kind(&mut stream, "update").await;

    let cube = async move {
        let line = lines.next_line().await.unwrap().unwrap();
        writer.write_all(b"S:04,0,31\r\n").await.unwrap();
        line
    };
    let (outcome, line) = tokio::join!(
        client.set_temperature(RfAddress::new([0x0a, 0x1b, 0x2c]), Mode::Boost, Some(25.0)),
        cube
    );

    outcome.unwrap();
    let payload = STANDARD.decode(line.strip_prefix("s:").unwrap()).unwrap();
    assert_eq!(&payload[6..9], [0x0a, 0x1b, 0x2c]);
    assert_eq!(payload[9], 3);
    assert_eq!(payload[10], 0xc0 | 50);

    let CubeEvent::Status(status) = next_kind(&mut stream, "status").await else {
        unreachable!();
    };
    assert_eq!(status.duty_cycle, 4);
    assert_eq!(status.memory_slots, 0x31);
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_end_event_stream_on_shutdown() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = CubeClient::connect(CubeConfig {
        port: listener.local_addr().unwrap().port(),
        ..CubeConfig::new("127.0.0.1")
    });
    let mut stream = BroadcastStream::new(client.subscribe());
    let _socket = listener.accept().await.unwrap();
    next_kind(&mut stream, "connected").await;

    client.shutdown().await;

    let rest: Vec<_> = tokio::time::timeout(WAIT, stream.collect())
        .await
        .unwrap();
    assert!(rest.is_empty());
}
