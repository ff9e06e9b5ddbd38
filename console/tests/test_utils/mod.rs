//! Test utilities and helpers
//!
//! A scripted backend and a recording dialog shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use srd_console::client::{HttpRequest, HttpResponse, HttpTransport};
use srd_console::{Dialog, RequestError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

type Scripted = Result<HttpResponse, RequestError>;

/// In-memory backend answering from per-path scripts.
///
/// Responses queued for a path are served in order; the last one keeps being
/// served once the queue is down to it. Unscripted paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, response: Scripted) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let path = request.path.clone();
        self.requests.lock().unwrap().push(request);

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(HttpResponse::text(404, format!("no route for {}", path))),
        }
    }
}

/// Dialog that remembers every message instead of blocking
#[derive(Default)]
pub struct RecordingDialog {
    messages: Mutex<Vec<String>>,
}

impl RecordingDialog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Dialog for RecordingDialog {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
