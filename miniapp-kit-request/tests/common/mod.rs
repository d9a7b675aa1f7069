//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use miniapp_kit_request::{
    ClientConfig, HttpRequest, RawResponse, RequestClient, RequestError, Transport,
};
use miniapp_kit_storage::MemoryStorage;

pub const BASE_HOST: &str = "https://api.example.com";

/// Transport that records every request and replays queued responses.
///
/// When the queue is empty it answers `{"code":0,"data":null,"message":"ok"}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<RawResponse, RequestError>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_response(&self, response: RawResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_error(&self, error: RequestError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, RequestError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(RawResponse::new(
                200,
                r#"{"code":0,"data":null,"message":"ok"}"#,
            ))
        })
    }
}

/// Client with the default chain, a base host and a seeded token.
pub fn client_with_token(
    token: &str,
) -> (RequestClient, Arc<RecordingTransport>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::with_items([("token", token)]));
    let transport = RecordingTransport::new();
    let config = ClientConfig::builder()
        .base_host(BASE_HOST)
        .default_chain(storage.clone())
        .build();
    let client = RequestClient::new(config, transport.clone());
    (client, transport, storage)
}
