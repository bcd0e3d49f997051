// In-memory ApiClient that replays scripted responses

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::{
    api::{ApiClient, Params},
    error::ApiError,
};

type Key = (String, String);

#[derive(Default)]
pub struct ScriptedApi {
    // The last scripted response for a route repeats once the rest are used up
    scripts: Mutex<HashMap<Key, VecDeque<Result<Value, ApiError>>>>,
    calls: Mutex<Vec<(Key, HashMap<String, String>)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_get(&self, path: &str, response: Result<Value, ApiError>) {
        self.script("GET", path, response);
    }

    pub fn script_post(&self, path: &str, response: Result<Value, ApiError>) {
        self.script("POST", path, response);
    }

    fn script(&self, method: &str, path: &str, response: Result<Value, ApiError>) {
        self.scripts
            .lock()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    // Parameters of every call made to `method path`, in order.
    pub fn calls(&self, method: &str, path: &str) -> Vec<HashMap<String, String>> {
        self.calls
            .lock()
            .iter()
            .filter(|((m, p), _)| m == method && p == path)
            .map(|(_, params)| params.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    fn respond(&self, method: &str, path: &str, params: &Params<'_>) -> Result<Value, ApiError> {
        let key = (method.to_string(), path.to_string());
        let recorded = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.calls.lock().push((key.clone(), recorded));

        let mut scripts = self.scripts.lock();
        match scripts.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(ApiError::Status {
                status: 404,
                body: format!("no script for {method} {path}"),
            }),
        }
    }
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn get(&self, path: &str, query: &Params<'_>) -> Result<Value, ApiError> {
        self.respond("GET", path, query)
    }

    async fn post(&self, path: &str, form: &Params<'_>) -> Result<Value, ApiError> {
        self.respond("POST", path, form)
    }
}
