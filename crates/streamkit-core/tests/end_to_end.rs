//! End-to-end scenarios exercising `Context<TcpIoLayer>` against a real
//! loopback listener: a single-chunk response, a response split across
//! several reads, and a request line with range query parameters. Short
//! writes across two writable events and a connect-in-progress error are
//! exercised at the cursor level in `streamkit-transport-tcp`'s own tests,
//! since reliably forcing a real socket into a short-write condition needs
//! platform-specific buffer tuning this suite doesn't rely on.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use streamkit_core::codec::{Timestamp, Value};
use streamkit_core::config::ClientConfig;
use streamkit_transport_tcp::connect;

fn spawn_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[test]
fn feed_get_returns_single_datapoint() {
    let (listener, port) = spawn_listener();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).unwrap();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 25\r\n\r\ntemp,2013-06-01T12:00:00Z,23")
            .unwrap();
    });

    let config = ClientConfig::new("127.0.0.1", port, "test-key");
    let mut ctx = connect(config).expect("build context");
    let response = ctx.datastream_get(12345, "temp").expect("request succeeds");

    assert_eq!(response.status, 200);
    let point = response.single_datapoint().expect("one datapoint");
    assert_eq!(point.value, Value::Int(23));

    server.join().unwrap();
}

#[test]
fn response_parsed_across_three_read_chunks() {
    let (listener, port) = spawn_listener();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf).unwrap();

        stream.write_all(b"HTTP/1.1 20").unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        stream.write_all(b"0 OK\r\nContent-Length: 4\r\n\r").unwrap();
        stream.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        stream.write_all(b"\nOKAY").unwrap();
    });

    let config = ClientConfig::new("127.0.0.1", port, "test-key");
    let mut ctx = connect(config).expect("build context");
    let response = ctx.feed_get(1).expect("request succeeds");
    assert_eq!(response.status, 200);

    server.join().unwrap();
}

#[test]
fn range_delete_request_line_matches_on_wire_bytes() {
    let (listener, port) = spawn_listener();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 1024];
        let n = stream.read(&mut buf).unwrap();
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    });

    let config = ClientConfig::new("127.0.0.1", port, "k");
    let mut ctx = connect(config).expect("build context");
    let start = Timestamp::parse("2013-06-01T00:00:00Z").unwrap();
    let end = Timestamp::parse("2013-06-02T00:00:00Z").unwrap();
    let response = ctx
        .datapoint_delete_range(9, "s1", start, end)
        .expect("request succeeds");
    assert_eq!(response.status, 200);

    let request_text = server.join().unwrap();
    let request_line = request_text.lines().next().unwrap();
    assert_eq!(
        request_line,
        "DELETE /v2/feeds/9/datastreams/s1/datapoints?start=2013-06-01T00:00:00Z&end=2013-06-02T00:00:00Z HTTP/1.1"
    );
    assert!(request_text.contains("Content-Length: 0"));
}
