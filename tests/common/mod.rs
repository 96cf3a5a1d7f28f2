//! Shared fixtures for integration tests: a loopback HTTP server and a
//! shell script standing in for `java`

#![allow(dead_code)]

use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

pub const JAR_BYTES: &[u8] = b"PK\x03\x04fake-yaml-plugin";

pub const YAML_PATH: &str =
    "/tomzo/gocd-yaml-config-plugin/releases/download/0.13.0/yaml-config-plugin-0.13.0.jar";

pub const PLUGIN_INFO_PATH: &str = "/go/api/admin/plugin_info";

pub const PLUGIN_INFO_BODY: &str = r#"{
  "_links": {"self": {"href": "http://localhost/go/api/admin/plugin_info"}},
  "_embedded": {
    "plugin_info": [
      {"id": "cd.go.authorization.ldap", "about": {"version": "2.2.0"}},
      {"id": "yaml.config.plugin", "about": {"name": "YAML", "version": "0.14.2"}}
    ]
  }
}"#;

/// Response served for one request
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn jar(body: &[u8]) -> Self {
        Self::new(200, "application/java-archive", body)
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self::new(status, "application/json", body)
    }
}

/// Request line and headers as received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Minimal HTTP/1.1 server answering each request through a handler
pub struct LoopbackServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl LoopbackServer {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let request = parse_head(&read_head(&mut stream));
                let reply = handler(&request.path);
                recorded.lock().unwrap().push(request);

                let header = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
                    reply.status,
                    reason(reply.status),
                    reply.body.len(),
                    reply.content_type,
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&reply.body);
                let _ = stream.flush();
            }
        });

        Self { addr, requests }
    }

    /// Serves the same status and body for every path
    pub fn fixed(status: u16, body: &'static [u8]) -> Self {
        Self::start(move |_| Reply::new(status, "application/java-archive", body))
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

fn read_head(stream: &mut impl Read) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn parse_head(head: &str) -> RecordedRequest {
    let mut lines = head.lines();
    let path = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();
    RecordedRequest { path, headers }
}

/// Writes an executable `java` stand-in into `dir`
///
/// The script appends its arguments to `java.log` next to it, prints a line
/// and exits with `exit_code`.
pub fn fake_java(dir: &Path, exit_code: i32) -> PathBuf {
    let script = dir.join("java");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\necho \"$*\" >> '{}'\necho 'files are valid'\nexit {exit_code}\n",
            dir.join("java.log").display()
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

/// Lines logged by [`fake_java`] in `dir`
pub fn java_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("java.log"))
        .map(|log| log.lines().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// Writes a minimal YAML pipeline file
pub fn write_pipeline(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "format_version: 10\npipelines: {}\n").unwrap();
    path
}
