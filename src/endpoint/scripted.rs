//! Scripted in-memory endpoint for unit tests.
//!
//! Responses are queued up front and handed out in order; the call count
//! lets tests assert exactly how many fetches a sequence or poller issued.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::endpoint::{Endpoint, EndpointRequest, EndpointResponse};
use crate::error::{CoreError, RequestError};

pub struct ScriptedEndpoint {
    responses: Mutex<VecDeque<Result<EndpointResponse, CoreError>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<EndpointRequest>>,
}

impl ScriptedEndpoint {
    pub fn new(responses: Vec<Result<EndpointResponse, CoreError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<EndpointRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn response(code: u16, body: serde_json::Value) -> EndpointResponse {
        EndpointResponse::new(code, HashMap::new(), body, "http://scripted.test/")
    }

    pub fn response_with_headers(
        code: u16,
        headers: &[(&str, &str)],
        body: serde_json::Value,
    ) -> EndpointResponse {
        let headers = headers
            .iter()
            .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
            .collect();
        EndpointResponse::new(code, headers, body, "http://scripted.test/")
    }
}

impl Endpoint for ScriptedEndpoint {
    async fn fetch(&self, request: EndpointRequest) -> Result<EndpointResponse, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CoreError::Request(RequestError::transport(
                    "scripted endpoint exhausted",
                )))
            })
    }
}
