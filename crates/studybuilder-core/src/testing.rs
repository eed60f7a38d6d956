//! Scripted transport for unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::http::{Gateway, NoAuth, PreparedRequest, RawResponse, Transport, TransportError};
use crate::i18n::MessageCatalog;
use crate::notifications::NotificationQueue;

pub const BASE_URL: &str = "https://sb.example.com/api/";

/// Records requests and replays scripted responses, `200 {}` once exhausted
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<PreparedRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(RawResponse::json(status, &body)));
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> PreparedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::json(200, &json!({}))))
    }
}

pub fn gateway(transport: Arc<FakeTransport>) -> Gateway {
    Gateway::with_transport(
        Arc::new(AppContext::new(BASE_URL).unwrap()),
        transport,
        Arc::new(NoAuth),
        Arc::new(MessageCatalog::with_defaults()),
        NotificationQueue::new(),
    )
}

/// Path of a recorded request relative to the API root
pub fn relative_path(request: &PreparedRequest) -> String {
    request
        .url
        .path()
        .trim_start_matches("/api/")
        .to_string()
}
