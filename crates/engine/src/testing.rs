//! Fakes for exercising handlers without a network.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use taas_api::{ApiError, ApiRequest, LogStreamer, Method, Service, StreamError, TaasApi, Transport};
use taas_util::{RecordingTerminal, ScriptedPrompter};

use crate::CommandContext;

pub const TAAS_URL: &str = "https://taas.example.com";
pub const PLATFORM_URL: &str = "https://apps.example.com";

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16, String),
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    replies: VecDeque<Reply>,
}

/// Transport answering stubbed routes and recording every request.
///
/// A route replays its replies in order and repeats the last one. Requests
/// without a route fail with status 599.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, method: Method, path: &str, reply: Reply) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            match routes.iter_mut().find(|route| route.method == method && route.path == path) {
                Some(route) => route.replies.push_back(reply),
                None => routes.push(Route {
                    method,
                    path: path.to_string(),
                    replies: VecDeque::from([reply]),
                }),
            }
        }
        self
    }

    pub fn on(self, method: Method, path: &str, body: Value) -> Self {
        self.push(method, path, Reply::Json(body))
    }

    pub fn fail(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Reply::Status(status, body.to_string()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    /// Recorded requests matching `method`, as `path` strings.
    pub fn paths(&self, method: Method) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method)
            .map(|request| request.path)
            .collect()
    }

    pub fn bodies(&self, method: Method, path: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && request.path == path)
            .filter_map(|request| request.body)
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let reply = self.routes.lock().ok().and_then(|mut routes| {
            let route = routes
                .iter_mut()
                .find(|route| route.method == request.method && route.path == request.path)?;
            if route.replies.len() > 1 {
                route.replies.pop_front()
            } else {
                route.replies.front().cloned()
            }
        });
        match reply {
            Some(Reply::Json(body)) => Ok(body),
            Some(Reply::Status(status, body)) => Err(ApiError::Remote { status, body }),
            None => Err(ApiError::Remote {
                status: 599,
                body: format!("no route for {} {}", request.method, request.path),
            }),
        }
    }

    fn base_url(&self, service: Service) -> &str {
        match service {
            Service::Taas => TAAS_URL,
            Service::Platform => PLATFORM_URL,
        }
    }
}

/// One scripted connection of [`FakeStreamer`].
#[derive(Debug, Clone)]
pub enum Connection {
    /// Write the text, then close cleanly.
    Close(&'static str),
    Reset,
    Refused,
}

/// Log streamer replaying scripted connections; clean closes once exhausted.
#[derive(Debug, Default)]
pub struct FakeStreamer {
    script: Mutex<VecDeque<Connection>>,
    attempts: Mutex<Vec<String>>,
}

impl FakeStreamer {
    pub fn new(script: impl IntoIterator<Item = Connection>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: Mutex::default(),
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().map(|attempts| attempts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LogStreamer for FakeStreamer {
    async fn stream_logs(&self, id: &str, sink: &mut (dyn Write + Send)) -> Result<(), StreamError> {
        if let Ok(mut attempts) = self.attempts.lock() {
            attempts.push(id.to_string());
        }
        let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
        match next.unwrap_or(Connection::Close("")) {
            Connection::Close(text) => {
                sink.write_all(text.as_bytes())?;
                Ok(())
            }
            Connection::Reset => Err(StreamError::ConnectionReset),
            Connection::Refused => Err(StreamError::Request(ApiError::network("connection refused"))),
        }
    }
}

/// A context wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub context: CommandContext,
    pub transport: Arc<FakeTransport>,
    pub terminal: RecordingTerminal,
    pub prompter: ScriptedPrompter,
}

pub fn harness(transport: FakeTransport) -> Harness {
    harness_with_answers(transport, Vec::<String>::new())
}

pub fn harness_with_answers<I, S>(transport: FakeTransport, answers: I) -> Harness
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let transport = Arc::new(transport);
    let terminal = RecordingTerminal::new();
    let prompter = ScriptedPrompter::new(answers);
    let context = CommandContext::new(
        TaasApi::new(transport.clone()),
        Arc::new(terminal.clone()),
        Arc::new(prompter.clone()),
    );
    Harness {
        context,
        transport,
        terminal,
        prompter,
    }
}
