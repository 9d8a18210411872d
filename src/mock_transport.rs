//! Scripted transport used by the unit tests in place of a real supply.

use std::collections::{HashMap, VecDeque};
use std::io;

use async_trait::async_trait;

use crate::transport::Transport;

pub struct MockTransport {
    /// Every line handed to `send_line`, in order.
    pub sent: Vec<String>,
    /// Replies served before falling back to emulation. `*IDN?` is always
    /// answered with `identity` instead.
    replies: VecDeque<String>,
    /// Answer queries from the values previously written, like a supply would.
    echo: bool,
    identity: String,
    settings: HashMap<String, String>,
    last_query: Option<String>,
    pub should_error_on_write: bool,
    pub should_error_on_read: bool,
    pub closed: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            replies: VecDeque::new(),
            echo: false,
            identity: "THURLBY THANDAR,PL601-P,0,1.10-1.00-1.00".to_string(),
            settings: HashMap::new(),
            last_query: None,
            should_error_on_write: false,
            should_error_on_read: false,
            closed: false,
        }
    }

    /// A transport that behaves like an attached supply.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = identity.to_string();
        self
    }

    pub fn push_reply(&mut self, reply: &str) {
        self.replies.push_back(reply.to_string());
    }

    fn record_setting(&mut self, line: &str) {
        if line == "OPALL0" {
            for (key, value) in self.settings.iter_mut() {
                if key.starts_with("OP") {
                    *value = "0".to_string();
                }
            }
            return;
        }
        if let Some((key, value)) = line.split_once(' ') {
            self.settings.insert(key.to_string(), value.to_string());
        }
    }

    fn setting(&self, key: &str) -> &str {
        self.settings.get(key).map(String::as_str).unwrap_or("0")
    }

    fn emulate(&self, query: &str) -> Option<String> {
        if query == "EER?" {
            return Some("0".to_string());
        }

        let key = query.strip_suffix('?')?;
        if let Some(setpoint) = key.strip_suffix('O') {
            let unit = if setpoint.starts_with('V') { "V" } else { "A" };
            return Some(format!("{}{unit}", self.setting(setpoint)));
        }
        if key.starts_with("OP") {
            return Some(self.setting(key).to_string());
        }
        if let Some(ch) = key.strip_prefix("OVP") {
            return Some(format!("VP{ch} {}", self.setting(key)));
        }
        if let Some(ch) = key.strip_prefix("OCP") {
            return Some(format!("CP{ch} {}", self.setting(key)));
        }
        Some(format!("{key} {}", self.setting(key)))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        if self.should_error_on_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated write error"));
        }
        self.sent.push(line.to_string());
        if line.ends_with('?') {
            self.last_query = Some(line.to_string());
        } else if self.echo {
            self.record_setting(line);
        }
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<String> {
        if self.should_error_on_read {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "simulated read timeout"));
        }
        let query = self.last_query.take();
        if query.as_deref() == Some("*IDN?") {
            return Ok(self.identity.clone());
        }
        if let Some(reply) = self.replies.pop_front() {
            return Ok(reply);
        }
        match query {
            Some(query) if self.echo => self
                .emulate(&query)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown query")),
            _ => Err(io::Error::new(io::ErrorKind::WouldBlock, "no reply queued")),
        }
    }

    async fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
