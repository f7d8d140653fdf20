//! Integration test: OPTIONS → 401 → OPTIONS with Authorization → 200,
//! then interleaved blocks, against a scripted peer over real TCP.
//!
//! The peer runs on its own thread, reads each request up to the blank
//! line, and answers from a fixed script.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use rtsp::{Client, ClientConfig, Response};

/// Fixed port for integration test. bind_addr must be explicit (no port 0).
const TEST_BIND: &str = "127.0.0.1:18555";

/// Digest response for admin/secret, OPTIONS on the test URL.
const EXPECTED_RESPONSE: &str = "0d8fa843e7d97796058f041c4e38236a";

fn read_request(reader: &mut BufReader<TcpStream>) -> String {
    let mut request = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).expect("peer read") == 0 {
            break;
        }
        request.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    request
}

#[test]
fn digest_handshake_then_interleaved_blocks() {
    let listener = TcpListener::bind(TEST_BIND).expect("bind test peer");

    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut writer = stream.try_clone().expect("clone stream");
        let mut reader = BufReader::new(stream);

        let first = read_request(&mut reader);
        writer
            .write_all(
                b"RTSP/1.0 401 Unauthorized\r\n\
                  CSeq: 1\r\n\
                  WWW-Authenticate: Digest realm=\"LIVE555 Streaming Media\", nonce=\"c633aaf8b83127633cbe98fac1d20d87\"\r\n\
                  \r\n",
            )
            .unwrap();

        let second = read_request(&mut reader);
        let mut reply = b"RTSP/1.0 200 OK\r\n\
                          CSeq: 2\r\n\
                          Public: OPTIONS, DESCRIBE, SETUP, PLAY, TEARDOWN\r\n\
                          Session: 47112344;timeout=60\r\n\
                          Content-Length: 4\r\n\
                          \r\n\
                          done"
            .to_vec();
        // Noise, then a block on channel 1 (sub-stream 0).
        reply.extend_from_slice(b"\r\n\r\n");
        reply.extend_from_slice(&[0x24, 0x01, 0x00, 0x03, 0x80, 0x60, 0x00]);
        writer.write_all(&reply).unwrap();

        (first, second)
    });

    let url = format!("rtsp://admin:secret@{TEST_BIND}/stream");
    let mut client = Client::connect(&url, ClientConfig::default()).expect("connect");
    client
        .get_ref()
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    assert_eq!(client.target(), format!("rtsp://{TEST_BIND}/stream"));

    let challenged = client.options().expect("first OPTIONS");
    assert_eq!(challenged.status_code, 401);
    assert_eq!(client.session_id(), None);

    let resp = client.options().expect("authorized OPTIONS");
    assert!(resp.is_success());
    assert_eq!(
        resp.get_header("Public"),
        Some("OPTIONS, DESCRIBE, SETUP, PLAY, TEARDOWN")
    );
    assert!(resp.body.is_empty(), "OPTIONS body is discarded");
    assert_eq!(client.session_id(), Some("47112344"));
    assert_eq!(client.cseq(), 2);

    assert_eq!(client.register_stream("trackID=0"), Some(0));
    match client.read_response().expect("block after noise") {
        Response::Block(block) => {
            assert_eq!(block.channel, 1);
            assert_eq!(block.payload, vec![0x80, 0x60, 0x00]);
        }
        Response::Control(c) => panic!("expected block, got {} response", c.status_code),
    }

    let (first, second) = peer.join().expect("peer thread");
    assert!(
        first.starts_with(&format!("OPTIONS rtsp://{TEST_BIND}/stream RTSP/1.0\r\n")),
        "credentials must not leak into the request line: {first}"
    );
    assert!(first.contains("CSeq: 1\r\n"));
    assert!(!first.contains("Authorization:"));

    assert!(second.contains("CSeq: 2\r\n"));
    let expected_auth = format!(
        "Authorization: Digest username=\"admin\", realm=\"LIVE555 Streaming Media\", \
         nonce=\"c633aaf8b83127633cbe98fac1d20d87\", uri=\"rtsp://{TEST_BIND}/stream\", \
         response=\"{EXPECTED_RESPONSE}\"\r\n"
    );
    assert!(second.contains(&expected_auth), "got: {second}");
}
