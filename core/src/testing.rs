//! In-process transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::storage::MemoryStorage;

/// Replays queued responses in order and records every request it saw.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a `{success: true, data}` envelope.
    pub fn ok(self, data: Value) -> Self {
        let body = json!({"success": true, "message": "OK", "data": data});
        self.reply(HttpResponse::new(200, body.to_string()))
    }

    /// Queue an error envelope with `status`.
    pub fn fail(self, status: u16, message: &str) -> Self {
        let body = json!({"success": false, "message": message, "statusCode": status});
        self.reply(HttpResponse::new(status, body.to_string()))
    }

    pub fn offline(self) -> Self {
        self.push(Err(TransportError::Connection("connection refused".to_string())))
    }

    pub fn reply(self, response: HttpResponse) -> Self {
        self.push(Ok(response))
    }

    fn push(self, reply: Result<HttpResponse, TransportError>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|req| {
                let path = req.url.trim_start_matches(TEST_BASE_URL);
                format!("{} {}", req.method, path)
            })
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request.clone());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted reply".to_string())))
    }
}

pub const TEST_BASE_URL: &str = "http://api.test/api/v1";

pub fn client_with(storage: &MemoryStorage) -> ApiClient {
    ApiClient::new(ClientConfig::new(TEST_BASE_URL), Arc::new(storage.clone()))
}

pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "name": "Rafi",
        "email": "rafi@mail.com",
        "phone": "01712345678",
        "role": role,
        "isActive": true
    })
}

pub fn mess_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": format!("Mess {id}"),
        "address": "Dhanmondi, Dhaka",
        "status": "free",
        "payPerMonth": 4500,
        "ownerId": "owner1"
    })
}

pub fn booking_json(id: &str, booking_status: &str, payment_status: &str) -> Value {
    json!({
        "_id": id,
        "messId": mess_json("m1"),
        "bookingStatus": booking_status,
        "paymentStatus": payment_status,
        "paymentMethod": "online",
        "totalAmount": 4500,
        "tenantContact": {"name": "Rafi", "phone": "01712345678"}
    })
}
