// Scripted `CollectionSource` for unit tests under paused Tokio time.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use medtrack_api::{Document, Error, Fields};
use serde_json::{Value, json};

use crate::source::CollectionSource;

/// One scripted `list` reply: optional latency, then data or an HTTP status.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    delay: Duration,
    outcome: Result<Vec<Document>, u16>,
}

impl Reply {
    pub(crate) fn ok(docs: Vec<Document>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(docs),
        }
    }

    pub(crate) fn fail(status: u16) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(status),
        }
    }

    pub(crate) fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

pub(crate) struct ScriptedSource {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    created: Mutex<VecDeque<Result<String, u16>>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    listed: Mutex<Vec<String>>,
}

impl ScriptedSource {
    /// Replies from `script` in order, then `fallback` forever.
    pub(crate) fn new(script: impl IntoIterator<Item = Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            created: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            listed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn always(reply: Reply) -> Self {
        Self::new([], reply)
    }

    /// Queue the result of the next `create` (default `Ok("1")`).
    pub(crate) fn then_create(self, result: Result<&str, u16>) -> Self {
        self.created
            .lock()
            .unwrap()
            .push_back(result.map(str::to_owned));
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

fn http(status: u16) -> Error {
    Error::Http {
        status,
        body: String::new(),
    }
}

impl CollectionSource for ScriptedSource {
    fn list(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, Error>> + Send {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.listed.lock().unwrap().push(collection.to_owned());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.outcome.map_err(http)
        }
    }

    fn create(
        &self,
        _collection: &str,
        _fields: &Fields,
    ) -> impl Future<Output = Result<String, Error>> + Send {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .created
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("1".into()));
        async move { result.map_err(http) }
    }
}

pub(crate) fn docs(value: Value) -> Vec<Document> {
    serde_json::from_value(value).unwrap()
}

pub(crate) fn ambient() -> Vec<Document> {
    docs(json!([{"id": "1", "temperature": 21.5, "humidity": 40}]))
}

pub(crate) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}
