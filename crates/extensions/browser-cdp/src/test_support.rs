//! Fake DevTools endpoint: wiremock serves `/json/version`, a local
//! WebSocket server answers commands.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) struct FakeDevtools {
    pub http: MockServer,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeDevtools {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let log = log.clone();
                tokio::spawn(async move {
                    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    let (mut tx, mut rx) = ws.split();
                    while let Some(Ok(msg)) = rx.next().await {
                        let Message::Text(text) = msg else {
                            continue;
                        };
                        let req: Value = serde_json::from_str(&text).unwrap();
                        log.lock().push(req.clone());

                        if req["method"] == "Close.now" {
                            break;
                        }
                        if req["method"] == "Page.enable" {
                            let event = json!({
                                "method": "Page.frameNavigated",
                                "params": {},
                                "sessionId": req["sessionId"],
                            });
                            let _ = tx.send(Message::Text(event.to_string().into())).await;
                        }

                        let mut reply = respond(&req);
                        reply["id"] = req["id"].clone();
                        if tx.send(Message::Text(reply.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        let http = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "HeadlessChrome/126.0.6478.126",
                "Protocol-Version": "1.3",
                "User-Agent": "Mozilla/5.0",
                "webSocketDebuggerUrl": format!("ws://{}/devtools/browser/fake", ws_addr),
            })))
            .mount(&http)
            .await;

        Self { http, requests }
    }

    pub fn endpoint(&self) -> String {
        self.http.uri()
    }

    pub fn requests_for(&self, cdp_method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r["method"] == cdp_method)
            .cloned()
            .collect()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r["method"].as_str().map(String::from))
            .collect()
    }
}

fn respond(req: &Value) -> Value {
    match req["method"].as_str().unwrap_or_default() {
        "Target.createTarget" => json!({"result": {"targetId": "T1"}}),
        "Target.attachToTarget" => json!({"result": {"sessionId": "S1"}}),
        "Page.captureScreenshot" => json!({"result": {"data": "iVBORw0KGgo="}}),
        "Page.addScriptToEvaluateOnNewDocument" => json!({"result": {"identifier": "1"}}),
        "Fail.me" => json!({"error": {"code": -32601, "message": "'Fail.me' wasn't found"}}),
        "Runtime.evaluate" => evaluate(req["params"]["expression"].as_str().unwrap_or_default()),
        _ => json!({"result": {}}),
    }
}

fn evaluate(expression: &str) -> Value {
    if expression.starts_with("throw") {
        return json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"type": "object", "description": "Error: boom"},
            },
        });
    }

    let value = if expression == "window.location.href" {
        json!("about:blank")
    } else if expression == "document.readyState" {
        json!("complete")
    } else if expression.ends_with("\"inspect\", null)")
        || expression.ends_with("\"scrollIntoView\", null)")
    {
        json!({
            "count": 1,
            "tag": "input",
            "visible": true,
            "enabled": true,
            "rect": {"x": 10.0, "y": 20.0, "width": 100.0, "height": 40.0},
        })
    } else if expression.contains("\"fill\", ") || expression.contains("\"select\", ") {
        json!({"ok": true})
    } else {
        Value::Null
    };
    json!({"result": {"type": "object", "value": value}})
}
