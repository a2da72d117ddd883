//! In-memory `Transport` used by unit tests: scripted replies per
//! endpoint, plus a log of every call made.

use reqwest::Url;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::client::{ApiClient, Method};
use crate::error::{DispatchError, Result};
use crate::session::{Credential, Params, Session};
use crate::transport::{RawResponse, Transport};

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub params: Params,
}

enum Reply {
    Response(RawResponse),
    Fail(String),
}

#[derive(Default)]
struct State {
    replies: HashMap<(Method, String), VecDeque<Reply>>,
    calls: Vec<Call>,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`. Replies for the same endpoint are
    /// served in the order they were queued.
    pub fn reply(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Reply::Response(RawResponse::new(status, body)))
    }

    pub fn ok(&self, method: Method, path: &str, body: &str) -> &Self {
        self.reply(method, path, 200, body)
    }

    pub fn fail(&self, method: Method, path: &str, cause: &str) -> &Self {
        self.push(method, path, Reply::Fail(cause.to_string()))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(session(), Box::new(self.clone()))
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.state
            .borrow_mut()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    fn exchange(&self, method: Method, url: &Url, params: &Params) -> Result<RawResponse> {
        let path = url
            .path()
            .strip_prefix("/api/1.0/")
            .unwrap_or(url.path())
            .to_string();
        let mut state = self.state.borrow_mut();
        state.calls.push(Call {
            method,
            path: path.clone(),
            params: params.clone(),
        });
        let reply = state
            .replies
            .get_mut(&(method, path.clone()))
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Response(r)) => Ok(r),
            Some(Reply::Fail(cause)) => Err(DispatchError::transport(cause)),
            None => panic!("no scripted reply for {method} {path}"),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &Url, params: &Params) -> Result<RawResponse> {
        self.exchange(Method::Get, url, params)
    }

    fn post(&self, url: &Url, params: &Params) -> Result<RawResponse> {
        self.exchange(Method::Post, url, params)
    }
}

pub fn session() -> Session {
    Session::new("plant.example.com", "7", Credential::new("test-key")).unwrap()
}

/// `{"success":true,"data":[...]}` for the given `(id, code)` pairs.
pub fn records(items: &[(i64, &str)]) -> String {
    let data: Vec<serde_json::Value> = items
        .iter()
        .map(|(id, code)| serde_json::json!({"id": id, "code": code, "description": format!("{code} desc")}))
        .collect();
    serde_json::json!({"success": true, "data": data}).to_string()
}

pub const ACK: &str = r#"{"success":true}"#;

/// Clock pinned to one instant.
pub struct FixedClock(pub chrono::NaiveDateTime);

impl crate::time::Clock for FixedClock {
    fn now(&self) -> chrono::NaiveDateTime {
        self.0
    }
}
