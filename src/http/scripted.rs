//! Scripted in-memory client
//!
//! Replays a fixed queue of responses in order and records every request it
//! was handed. Used to drive scenarios without a live service.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::common::{Error, Result};

use super::client::HttpClient;
use super::protocol::{HttpRequest, HttpResponse};

enum Reply {
    Response(HttpResponse),
    Refused(String),
}

/// Client that answers from a pre-recorded script
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn respond(self, response: HttpResponse) -> Self {
        self.push(Reply::Response(response));
        self
    }

    /// Queue a response with a raw body
    pub fn respond_with(self, status: u16, body: &str) -> Self {
        self.respond(HttpResponse::new(status, body))
    }

    /// Queue a response with a JSON body
    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(HttpResponse::json(status, &body))
    }

    /// Queue a transport failure
    pub fn refuse(self, message: &str) -> Self {
        self.push(Reply::Refused(message.to_string()));
        self
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let path = request.path.clone();

        self.requests
            .lock()
            .map_err(|_| Error::Internal("scripted client lock poisoned".to_string()))?
            .push(request);

        let reply = self
            .replies
            .lock()
            .map_err(|_| Error::Internal("scripted client lock poisoned".to_string()))?
            .pop_front();

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Refused(message)) => Err(Error::transport(method.as_str(), &path, message)),
            None => Err(Error::Internal(format!(
                "no scripted response left for {} {}",
                method, path
            ))),
        }
    }
}
