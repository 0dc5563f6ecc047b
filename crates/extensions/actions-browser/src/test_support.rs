//! Recording page and canned model for action tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use webhands_protocols::{
    ActionContext, BrowserPage, CompletionRequest, CompletionResponse, DomState, ElementFingerprint,
    InteractiveElement, LLMProvider, Locator, LocatorInfo, Message, OutputSchema, PageError,
    ProviderError, Rect, StructuredOutputMethod, Usage,
};

/// Page that records every call as a short string.
#[derive(Default)]
pub struct RecordingPage {
    pub calls: Mutex<Vec<String>>,
    /// Consumed by `inspect`; the last entry repeats.
    pub inspections: Mutex<VecDeque<LocatorInfo>>,
    /// Returned by `evaluate`.
    pub evaluate_result: Mutex<Value>,
    pub fail_fill: Mutex<Option<String>>,
}

impl RecordingPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_inspections(infos: Vec<LocatorInfo>) -> Arc<Self> {
        let page = Self::default();
        *page.inspections.lock() = infos.into();
        Arc::new(page)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

pub fn info(count: usize, tag: &str) -> LocatorInfo {
    LocatorInfo {
        count,
        tag: Some(tag.to_string()),
        visible: true,
        enabled: true,
        rect: Some(Rect::new(0.0, 0.0, 20.0, 10.0)),
        fingerprint: Some(ElementFingerprint::default()),
    }
}

#[async_trait]
impl BrowserPage for RecordingPage {
    async fn url(&self) -> Result<String, PageError> {
        Ok("https://example.com/".to_string())
    }
    async fn goto(&self, url: &str) -> Result<(), PageError> {
        self.record(format!("goto {}", url));
        Ok(())
    }
    async fn go_back(&self) -> Result<(), PageError> {
        self.record("back".to_string());
        Ok(())
    }
    async fn go_forward(&self) -> Result<(), PageError> {
        self.record("forward".to_string());
        Ok(())
    }
    async fn reload(&self) -> Result<(), PageError> {
        self.record("reload".to_string());
        Ok(())
    }
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        self.record(format!("evaluate {}", expression));
        Ok(self.evaluate_result.lock().clone())
    }
    async fn screenshot(&self) -> Result<String, PageError> {
        Ok("iVBORw0KGgo=".to_string())
    }
    async fn inspect(&self, _locator: &Locator) -> Result<LocatorInfo, PageError> {
        let mut queue = self.inspections.lock();
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap_or_default())
        } else {
            Ok(queue.front().cloned().unwrap_or_default())
        }
    }
    async fn click(&self, locator: &Locator) -> Result<(), PageError> {
        self.record(format!("click {}", locator));
        Ok(())
    }
    async fn fill(&self, locator: &Locator, text: &str, timeout: Duration) -> Result<(), PageError> {
        if let Some(err) = self.fail_fill.lock().clone() {
            return Err(PageError::Timeout(err));
        }
        self.record(format!("fill {} {:?} {}ms", locator, text, timeout.as_millis()));
        Ok(())
    }
    async fn select_option(
        &self,
        locator: &Locator,
        label: &str,
        _timeout: Duration,
    ) -> Result<(), PageError> {
        self.record(format!("select {} {:?}", locator, label));
        Ok(())
    }
    async fn key_down(&self, key: &str) -> Result<(), PageError> {
        self.record(format!("down {}", key));
        Ok(())
    }
    async fn key_up(&self, key: &str) -> Result<(), PageError> {
        self.record(format!("up {}", key));
        Ok(())
    }
    async fn add_init_script(&self, _script: &str) -> Result<(), PageError> {
        Ok(())
    }
    async fn close(&self) -> Result<(), PageError> {
        Ok(())
    }
}

/// Model that answers every free-form completion with fixed text.
pub struct CannedLlm {
    pub answer: Result<String, String>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl CannedLlm {
    pub fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LLMProvider for CannedLlm {
    fn id(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "gpt-4o"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.requests.lock().push(request);
        match &self.answer {
            Ok(text) => Ok(CompletionResponse {
                id: "resp-1".to_string(),
                model: "gpt-4o".to_string(),
                message: Message::assistant(text.clone()),
                usage: Usage::default(),
            }),
            Err(message) => Err(ProviderError::Network(message.clone())),
        }
    }

    async fn complete_structured(
        &self,
        _request: CompletionRequest,
        _schema: &OutputSchema,
        _method: StructuredOutputMethod,
    ) -> Result<Value, ProviderError> {
        Err(ProviderError::InvalidRequest("not scripted".to_string()))
    }
}

pub fn element(index: u32, tag: &str) -> InteractiveElement {
    InteractiveElement {
        highlight_index: index,
        tag: tag.to_string(),
        attributes: Vec::new(),
        text: String::new(),
        rect: Rect::new(0.0, 0.0, 20.0, 10.0),
        reason: format!("Interactive HTML element: <{}>", tag),
        css_path: format!("html > body > {}", tag),
        xpath: format!("html/body/{}", tag),
        is_under_shadow_root: false,
        shadow_host: None,
        frame: None,
        fingerprint: ElementFingerprint::default(),
    }
}

pub fn context(
    page: Arc<RecordingPage>,
    elements: Vec<InteractiveElement>,
    llm: Arc<CannedLlm>,
) -> ActionContext {
    let mut state = DomState::default();
    for el in elements {
        state.elements.insert(el.highlight_index, el);
    }
    ActionContext::new(page, Arc::new(state), llm)
}
