//! Fakes shared by the step loop and agent tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use webhands_protocols::action::{Action, ActionContext, ActionDefinition, ActionOutcome};
use webhands_protocols::error::{ActionError, PageError, ProviderError};
use webhands_protocols::page::{BrowserPage, BrowserProvider, Locator, LocatorInfo};
use webhands_protocols::provider::{
    CompletionRequest, CompletionResponse, LLMProvider, OutputSchema, StructuredOutputMethod,
};
use webhands_protocols::types::{Message, Usage};

pub fn capture_payload() -> Value {
    json!({
        "metrics": {"url": "https://example.com/", "viewportWidth": 800, "viewportHeight": 600,
                    "scrollX": 0, "scrollY": 0, "scrollWidth": 800, "scrollHeight": 600,
                    "devicePixelRatio": 1},
        "roots": [{"id": 0, "kind": "document", "host": null, "children": [{"e": 0}]}],
        "nodes": [
            {"id": 0, "tag": "html", "parent": null, "root": 0, "children": [{"e": 1}],
             "rect": {"x": 0, "y": 0, "width": 800, "height": 600}},
            {"id": 1, "tag": "body", "parent": 0, "root": 0, "children": [{"e": 2}],
             "rect": {"x": 0, "y": 0, "width": 800, "height": 600}},
            {"id": 2, "tag": "button", "parent": 1, "root": 0, "children": [{"t": "Go"}],
             "text": "Go", "rect": {"x": 10, "y": 10, "width": 40, "height": 16}}
        ]
    })
}

/// Page whose capture results are queued; the last one repeats.
pub struct FakePage {
    captures: Mutex<VecDeque<Value>>,
    pub evaluated: Mutex<Vec<String>>,
    pub init_scripts: Mutex<Vec<String>>,
    pub closed: AtomicBool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::with_captures(vec![capture_payload()])
    }

    pub fn with_captures(captures: Vec<Value>) -> Self {
        Self {
            captures: Mutex::new(captures.into()),
            evaluated: Mutex::new(Vec::new()),
            init_scripts: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn url(&self) -> Result<String, PageError> {
        Ok("https://example.com/".to_string())
    }
    async fn goto(&self, _url: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn go_back(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn go_forward(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn reload(&self) -> Result<(), PageError> {
        Ok(())
    }
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        self.evaluated.lock().push(expression.to_string());
        if expression.contains("viewportWidth") {
            let mut queue = self.captures.lock();
            let value = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            return Ok(value.unwrap_or(Value::Null));
        }
        Ok(Value::Null)
    }
    async fn screenshot(&self) -> Result<String, PageError> {
        Ok("iVBORw0KGgo=".to_string())
    }
    async fn inspect(&self, _locator: &Locator) -> Result<LocatorInfo, PageError> {
        Ok(LocatorInfo::default())
    }
    async fn click(&self, _locator: &Locator) -> Result<(), PageError> {
        Ok(())
    }
    async fn fill(&self, _l: &Locator, _t: &str, _d: Duration) -> Result<(), PageError> {
        Ok(())
    }
    async fn select_option(&self, _l: &Locator, _v: &str, _d: Duration) -> Result<(), PageError> {
        Ok(())
    }
    async fn key_down(&self, _key: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn key_up(&self, _key: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn add_init_script(&self, script: &str) -> Result<(), PageError> {
        self.init_scripts.lock().push(script.to_string());
        Ok(())
    }
    async fn close(&self) -> Result<(), PageError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Browser handing out one shared [`FakePage`].
pub struct FakeBrowser {
    pub page: Arc<FakePage>,
    pub pages_opened: AtomicU32,
    pub closed: AtomicBool,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            page: Arc::new(FakePage::new()),
            pages_opened: AtomicU32::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BrowserProvider for FakeBrowser {
    fn id(&self) -> &str {
        "fake"
    }
    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>, PageError> {
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(self.page.clone())
    }
    async fn close(&self) -> Result<(), PageError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Model that replays queued agent outputs; the last one repeats.
pub struct ScriptedLlm {
    outputs: Mutex<VecDeque<Value>>,
    fail: bool,
    pub calls: AtomicU32,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new(outputs: Vec<Value>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            fail: false,
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }
}

pub fn agent_output(actions: Value) -> Value {
    json!({"thoughts": "", "memory": "", "nextGoal": "", "actions": actions})
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    fn id(&self) -> &str {
        "scripted"
    }
    fn model(&self) -> &str {
        "gpt-4o"
    }
    async fn complete(&self, _r: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            id: "r".to_string(),
            model: "gpt-4o".to_string(),
            message: Message::assistant("ok"),
            usage: Usage::default(),
        })
    }
    async fn complete_structured(
        &self,
        request: CompletionRequest,
        _schema: &OutputSchema,
        _method: StructuredOutputMethod,
    ) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
        if self.fail {
            return Err(ProviderError::Network("connection reset".to_string()));
        }
        let mut queue = self.outputs.lock();
        let value = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(value.unwrap_or_else(|| agent_output(json!([]))))
    }
}

/// Action that counts its runs.
pub struct CountingAction {
    definition: ActionDefinition,
    pub runs: AtomicU32,
}

impl CountingAction {
    pub fn new(name: &str) -> Self {
        Self {
            definition: ActionDefinition::new(name, "counts"),
            runs: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Action for CountingAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }
    async fn run(&self, _params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        let n = self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(ActionOutcome::success(format!("run {}", n)))
    }
}

/// Action whose executor always errors.
pub struct ExplodingAction {
    definition: ActionDefinition,
}

impl ExplodingAction {
    pub fn new() -> Self {
        Self {
            definition: ActionDefinition::new("explode", "always fails"),
        }
    }
}

#[async_trait]
impl Action for ExplodingAction {
    fn definition(&self) -> &ActionDefinition {
        &self.definition
    }
    async fn run(&self, _params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
        Err(ActionError::ExecutionFailed("kaboom".to_string()))
    }
}
