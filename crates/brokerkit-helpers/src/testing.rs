//! Scripted raw client for helper tests.

use std::cell::RefCell;
use std::collections::HashMap;

use brokerkit_fetch::{Endpoint, RawClient, RawRequest, RawResponse};
use brokerkit_normalize::RawItem;
use brokerkit_types::TransportError;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Answers each endpoint with a canned outcome and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockClient {
    outcomes: HashMap<Endpoint, Result<RawResponse, TransportError>>,
    requests: RefCell<Vec<RawRequest>>,
}

impl MockClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, endpoint: Endpoint, response: RawResponse) -> Self {
        self.outcomes.insert(endpoint, Ok(response));
        self
    }

    pub(crate) fn fail(mut self, endpoint: Endpoint, err: TransportError) -> Self {
        self.outcomes.insert(endpoint, Err(err));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RawRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last_request(&self) -> Option<RawRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl RawClient for MockClient {
    fn submit(&self, request: &RawRequest) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(request.clone());
        self.outcomes
            .get(&request.endpoint)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::new(format!("unscripted {}", request.endpoint)).with_status(404)))
    }
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 16, 0, 0).unwrap()
}

pub(crate) fn object(value: Value) -> RawItem {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture must be an object"),
    }
}
