//! Common test utilities for integration tests.
//!
//! This module provides shared infrastructure for LSP integration tests,
//! including the `LspClient` for communicating with the server binary.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, Stdio};

/// A message the server sent on its own: a notification or a request.
#[derive(Debug, Clone)]
pub(crate) struct ServerMessage {
    /// The LSP method name (e.g., "workspace/applyEdit").
    pub method: String,
    /// The full message parameters.
    pub params: Value,
}

/// LSP test client for communicating with the server binary.
///
/// Requests from the server are answered automatically: `workspace/applyEdit`
/// is accepted, everything else gets a `null` result.
pub(crate) struct LspClient {
    process: Child,
    reader: BufReader<std::process::ChildStdout>,
    /// Notifications in the order received.
    notifications: Vec<ServerMessage>,
    /// Requests from the server in the order received.
    requests: Vec<ServerMessage>,
}

impl LspClient {
    /// Spawn the eqnum-lsp binary.
    pub(crate) fn spawn() -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_eqnum-lsp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn eqnum-lsp binary");

        let stdout = process.stdout.take().expect("Failed to capture stdout");

        Self {
            process,
            reader: BufReader::new(stdout),
            notifications: Vec::new(),
            requests: Vec::new(),
        }
    }

    /// Requests received from the server so far.
    pub(crate) fn requests(&self, method: &str) -> Vec<ServerMessage> {
        self.requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Send a JSON-RPC message to the server.
    pub(crate) fn send(&mut self, message: &Value) {
        let body = serde_json::to_string(message).unwrap();
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let stdin = self.process.stdin.as_mut().expect("stdin not captured");
        stdin.write_all(header.as_bytes()).unwrap();
        stdin.write_all(body.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    /// Read one JSON-RPC message from the server.
    fn read_message(&mut self) -> Value {
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .expect("Failed to read header");

            // EOF - server closed connection
            assert!(bytes_read != 0, "Server closed connection unexpectedly");

            if line == "\r\n" || line == "\n" {
                if content_length == 0 {
                    continue;
                }
                break;
            }

            if line.to_lowercase().starts_with("content-length:") {
                content_length = line
                    .split(':')
                    .nth(1)
                    .unwrap()
                    .trim()
                    .parse()
                    .expect("Invalid content length");
            }
        }

        let mut body = vec![0u8; content_length];
        self.reader
            .read_exact(&mut body)
            .expect("Failed to read body");

        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!("Invalid JSON: {e} in: {:?}", String::from_utf8_lossy(&body))
        })
    }

    /// Read the next message and file it.
    ///
    /// Returns responses to our own requests; notifications and server
    /// requests are recorded (and requests answered) and yield `None`.
    fn pump(&mut self) -> Option<Value> {
        let message = self.read_message();
        let Some(method) = message.get("method").and_then(|m| m.as_str()) else {
            return Some(message);
        };

        let captured = ServerMessage {
            method: method.to_string(),
            params: message.get("params").cloned().unwrap_or(Value::Null),
        };

        match message.get("id") {
            Some(id) => {
                let result = if captured.method == "workspace/applyEdit" {
                    json!({ "applied": true })
                } else {
                    Value::Null
                };
                let reply = json!({ "jsonrpc": "2.0", "id": id, "result": result });
                self.requests.push(captured);
                self.send(&reply);
            }
            None => self.notifications.push(captured),
        }
        None
    }

    /// Read until the response with the given id arrives.
    pub(crate) fn read_response(&mut self, expected_id: i64) -> Value {
        loop {
            if let Some(response) = self.pump()
                && response.get("id") == Some(&json!(expected_id))
            {
                return response;
            }
        }
    }

    /// Read until a notification with `method` satisfying `predicate` arrives.
    ///
    /// Only looks at notifications received after the call.
    pub(crate) fn wait_for_notification(
        &mut self,
        method: &str,
        predicate: impl Fn(&Value) -> bool,
    ) -> Value {
        let mut seen = self.notifications.len();
        loop {
            while seen < self.notifications.len() {
                let notification = &self.notifications[seen];
                seen += 1;
                if notification.method == method && predicate(&notification.params) {
                    return notification.params.clone();
                }
            }
            self.pump();
        }
    }

    /// Read until the server sends a request with `method`. It has already
    /// been answered when this returns.
    pub(crate) fn wait_for_request(&mut self, method: &str) -> Value {
        let mut seen = self.requests.len();
        loop {
            while seen < self.requests.len() {
                let request = &self.requests[seen];
                seen += 1;
                if request.method == method {
                    return request.params.clone();
                }
            }
            self.pump();
        }
    }

    /// Initialize the LSP session.
    pub(crate) fn initialize(&mut self, options: Value) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "processId": null,
                "capabilities": {
                    "workspace": {
                        "applyEdit": true,
                        "workspaceEdit": {
                            "documentChanges": true
                        },
                        "inlayHint": {
                            "refreshSupport": true
                        }
                    },
                    "textDocument": {
                        "publishDiagnostics": {}
                    }
                },
                "rootUri": "file:///tmp",
                "workspaceFolders": null,
                "initializationOptions": options
            }
        }));

        let response = self.read_response(1);

        // Send initialized notification
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "initialized",
            "params": {}
        }));

        response
    }

    /// Open a text document.
    pub(crate) fn did_open(&mut self, uri: &str, text: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": {
                "textDocument": {
                    "uri": uri,
                    "languageId": "latex",
                    "version": 1,
                    "text": text
                }
            }
        }));
    }

    /// Replace the whole text of a document.
    pub(crate) fn did_change(&mut self, uri: &str, version: i32, text: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didChange",
            "params": {
                "textDocument": {"uri": uri, "version": version},
                "contentChanges": [{"text": text}]
            }
        }));
    }

    /// Report the visible part of a document.
    pub(crate) fn visible_ranges(&mut self, uri: &str, last_line: u32) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "eqnum/didChangeVisibleRanges",
            "params": {
                "textDocument": {"uri": uri},
                "ranges": [{
                    "start": {"line": 0, "character": 0},
                    "end": {"line": last_line, "character": 0}
                }]
            }
        }));
    }

    /// Place a caret.
    pub(crate) fn caret(&mut self, uri: &str, line: u32, character: u32) {
        let position = json!({"line": line, "character": character});
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": "eqnum/didChangeSelection",
            "params": {
                "textDocument": {"uri": uri},
                "selections": [{"start": position, "end": position}]
            }
        }));
    }

    /// Request inlay hints.
    pub(crate) fn inlay_hints(&mut self, id: i64, uri: &str) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "textDocument/inlayHint",
            "params": {
                "textDocument": {"uri": uri},
                "range": {
                    "start": {"line": 0, "character": 0},
                    "end": {"line": 100, "character": 0}
                }
            }
        }));
        self.read_response(id)
    }

    /// Shutdown the server.
    pub(crate) fn shutdown(&mut self) -> Value {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 999,
            "method": "shutdown"
        }));
        self.read_response(999)
    }
}

impl Drop for LspClient {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}
