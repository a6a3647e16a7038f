#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SYSTEM_PROMPT: &str = "You help riders pick a bike.";
pub const GREETING: &str = "Hi! Can I help you find the right bike?";
pub const API_VERSION: &str = "2024-02-01";
pub const API_KEY: &str = "test-key-3f9a";

/// What the binary sent to the fake endpoint.
pub struct Captured {
    pub request_line: String,
    pub body: serde_json::Value,
}

/// Answers a single chat-completions call with `body`.
pub fn fake_endpoint(body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept should succeed");
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader
            .read_line(&mut request_line)
            .expect("request line should be readable");

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header should be readable");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().expect("content-length is numeric");
            }
        }
        let mut request_body = vec![0u8; content_length];
        reader
            .read_exact(&mut request_body)
            .expect("body should be readable");

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        reader
            .into_inner()
            .write_all(response.as_bytes())
            .expect("response should be writable");

        Captured {
            request_line: request_line.trim_end().to_string(),
            body: serde_json::from_slice(&request_body).expect("request body should be JSON"),
        }
    });
    (format!("http://{addr}"), handle)
}

/// An address nothing listens on.
pub fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}")
}

/// Empty directory unique to this test run, used as working directory so no
/// stray `.env` or `logs/` from the checkout is picked up.
pub fn scratch_dir(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after the epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("spokes-{label}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).expect("scratch dir should be creatable");
    dir
}

/// Pins every variable the binary reads, so nothing leaks in from the
/// caller's shell. Blank values count as unset.
pub fn spokes(endpoint: &str, workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spokes"));
    cmd.current_dir(workdir)
        .env("OPENAI_AZURE_KEY", API_KEY)
        .env("OPENAI_AZURE_ENDPOINT", endpoint)
        .env("OPENAI_AZURE_DEPLOYMENT", "bike-gpt")
        .env("OPENAI_AZURE_API_VERSION", API_VERSION)
        .env("SYSTEM_PROMPT", SYSTEM_PROMPT)
        .env("SYSTEM_PROMPT_FILE", "")
        .env("ASSISTANT_GREETING", GREETING)
        .env("RUST_LOG", "off")
        .env("LOG_FORMAT", "pretty")
        .env("LOG_OUTPUT", "stderr")
        .env("LOG_FILE_PATH", "");
    cmd
}

pub fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn spokes binary");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("stdin should be writable");
    child.wait_with_output().expect("spokes should exit")
}
