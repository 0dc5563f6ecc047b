use super::*;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::Ordering;

use webhands_protocols::error::ActionError;

use crate::test_support::{CountingAction, FakeBrowser, ScriptedLlm, agent_output};

fn settings() -> AgentSettings {
    AgentSettings {
        settle_delay: Duration::from_millis(1),
        retry: RetryConfig::new(3, Duration::from_millis(1)),
        ..Default::default()
    }
}

fn agent_with(outputs: Vec<Value>) -> (WebAgent, Arc<FakeBrowser>, Arc<ScriptedLlm>) {
    let browser = Arc::new(FakeBrowser::new());
    let llm = Arc::new(ScriptedLlm::new(outputs));
    let agent = WebAgent::new(llm.clone(), browser.clone(), settings());
    (agent, browser, llm)
}

fn complete_with(text: &str) -> Value {
    agent_output(json!([{"type": "complete", "params": {"success": true, "text": text}}]))
}

fn noop_forever() -> Value {
    agent_output(json!([{"type": "noop", "params": {}}]))
}

struct FakeToolServer {
    id: String,
    actions: Vec<Arc<dyn Action>>,
    closed: std::sync::atomic::AtomicBool,
}

impl FakeToolServer {
    fn new(id: &str, tools: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            actions: tools
                .iter()
                .map(|t| Arc::new(CountingAction::new(t)) as Arc<dyn Action>)
                .collect(),
            closed: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ToolServer for FakeToolServer {
    fn id(&self) -> &str {
        &self.id
    }
    fn actions(&self) -> Vec<Arc<dyn Action>> {
        self.actions.clone()
    }
    async fn close(&self) -> Result<(), ToolServerError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_register_duplicate_and_reserved() {
    let (agent, _, _) = agent_with(vec![]);
    agent
        .register_action(Arc::new(CountingAction::new("noop")))
        .unwrap();

    let err = agent
        .register_action(Arc::new(CountingAction::new("noop")))
        .unwrap_err();
    assert!(matches!(err, AgentError::Action(ActionError::AlreadyRegistered(_))));

    let err = agent
        .register_action(Arc::new(CountingAction::new("complete")))
        .unwrap_err();
    assert!(matches!(err, AgentError::Action(ActionError::ReservedName(_))));
}

#[test]
fn test_pprint_action() {
    let (agent, _, _) = agent_with(vec![]);
    let call = ActionCall::new("complete", json!({"success": true, "text": "x"}));
    assert_eq!(agent.pprint_action(&call), "Complete task with success");

    let call = ActionCall::new("unknown", json!({"a": 1}));
    let printed: Value = serde_json::from_str(&agent.pprint_action(&call)).unwrap();
    assert_eq!(printed, json!({"type": "unknown", "params": {"a": 1}}));
}

#[test]
fn test_variables() {
    let (agent, _, _) = agent_with(vec![]);
    agent.add_variable(Variable::new("city", "Paris", "destination"));
    assert_eq!(agent.get_variable("city").unwrap().value, "Paris");
    assert_eq!(agent.variables().len(), 1);
    agent.delete_variable("city");
    assert!(agent.get_variable("city").is_none());
}

#[tokio::test]
async fn test_execute_task_opens_page_once() {
    let (agent, browser, llm) = agent_with(vec![complete_with("done")]);
    agent.add_variable(Variable::new("email", "a@b.c", "login email"));

    let output = agent.execute_task("log in", TaskParams::new()).await.unwrap();
    assert_eq!(output.status, TaskStatus::Completed);
    assert_eq!(output.output.as_deref(), Some("done"));

    agent.execute_task("again", TaskParams::new()).await.unwrap();
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 1);
    assert_eq!(browser.page.init_scripts.lock().len(), 1);

    let requests = llm.requests.lock();
    let texts: Vec<String> = requests[0].messages.iter().map(|m| m.text()).collect();
    assert!(texts.contains(&"=== Variables ===\n<<email>> - login email\n".to_string()));
    assert!(texts.contains(&"=== Final Goal ===\nlog in\n".to_string()));
}

#[tokio::test]
async fn test_starting_page_gets_listener_tracker() {
    let (agent, browser, _) = agent_with(vec![complete_with("done")]);
    let page = Arc::new(crate::test_support::FakePage::new());

    let output = agent
        .execute_task("goal", TaskParams::new().with_starting_page(page.clone()))
        .await
        .unwrap();
    assert_eq!(output.status, TaskStatus::Completed);
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 0);
    assert_eq!(*page.init_scripts.lock(), vec![LISTENER_TRACKER_JS.to_string()]);
}

#[tokio::test]
async fn test_new_page_installs_tracker_without_replacing_current() {
    let (agent, browser, _) = agent_with(vec![]);

    agent.new_page().await.unwrap();
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 1);
    assert_eq!(
        *browser.page.init_scripts.lock(),
        vec![LISTENER_TRACKER_JS.to_string()]
    );

    agent.current_page().await.unwrap();
    assert_eq!(browser.pages_opened.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_output_schema_task() {
    let (agent, _, _) = agent_with(vec![agent_output(json!([
        {"type": "complete", "params": {"success": true, "outputSchema": {"price": 9.5}}}
    ]))]);
    let params = TaskParams::new().with_output_schema(json!({
        "type": "object",
        "properties": {"price": {"type": "number"}}
    }));

    let output = agent.execute_task("price?", params).await.unwrap();
    assert_eq!(output.status, TaskStatus::Completed);
    assert_eq!(output.output.as_deref(), Some("{\n  \"price\": 9.5\n}"));
    let outcome = &output.steps[0].action_outputs[0];
    assert_eq!(outcome.extract, Some(json!({"price": 9.5})));
}

#[tokio::test]
async fn test_callbacks_fire() {
    let (agent, _, _) = agent_with(vec![complete_with("ok")]);
    let steps = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let finished = Arc::new(parking_lot::Mutex::new(None));

    let params = {
        let steps = steps.clone();
        let finished = finished.clone();
        TaskParams::new()
            .on_step(move |step| steps.lock().push(step.idx))
            .on_complete(move |output| *finished.lock() = Some(output.status))
    };
    agent.execute_task("goal", params).await.unwrap();

    assert_eq!(*steps.lock(), vec![0]);
    assert_eq!(*finished.lock(), Some(TaskStatus::Completed));
}

#[tokio::test]
async fn test_async_task_control() {
    let (agent, _, _) = agent_with(vec![noop_forever()]);
    agent
        .register_action(Arc::new(CountingAction::new("noop")))
        .unwrap();

    let control = agent
        .execute_task_async("loop", TaskParams::new())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(control.pause(), TaskStatus::Paused);
    assert_eq!(agent.task_status(control.id()).unwrap(), TaskStatus::Paused);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let paused_steps = control.steps().len();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(control.steps().len() <= paused_steps + 1);

    assert_eq!(control.resume(), TaskStatus::Running);
    assert_eq!(control.cancel(), TaskStatus::Cancelled);
    assert_eq!(control.resume(), TaskStatus::Cancelled);

    let output = control.wait().await.unwrap();
    assert_eq!(output.status, TaskStatus::Cancelled);
    assert_eq!(agent.active_tasks(), 0);
}

#[tokio::test]
async fn test_async_failure_emits_error() {
    let (agent, _, _) = agent_with(vec![agent_output(json!([{"type": "fly", "params": {}}]))]);
    let control = agent
        .execute_task_async("goal", TaskParams::new())
        .await
        .unwrap();
    let mut errors = control.subscribe_errors();

    let output = control.wait().await.unwrap();
    assert_eq!(output.status, TaskStatus::Failed);
    assert_eq!(errors.recv().await.unwrap(), "Action not found: fly");
    assert_eq!(control.status(), TaskStatus::Failed);
}

#[tokio::test]
async fn test_max_steps_from_params() {
    let (agent, _, _) = agent_with(vec![noop_forever()]);
    agent
        .register_action(Arc::new(CountingAction::new("noop")))
        .unwrap();

    let output = agent
        .execute_task("goal", TaskParams::new().with_max_steps(1))
        .await
        .unwrap();
    assert_eq!(output.status, TaskStatus::Cancelled);
    assert_eq!(output.steps.len(), 1);
}

#[tokio::test]
async fn test_tool_server_lifecycle() {
    let (agent, _, _) = agent_with(vec![]);
    let server = Arc::new(FakeToolServer::new("fs", &["read_file", "list_dir"]));

    let id = agent.connect_tool_server(server.clone()).unwrap();
    assert_eq!(id, "fs");
    assert!(agent.is_connected("fs"));
    assert_eq!(agent.server_ids(), vec!["fs".to_string()]);
    assert!(agent.action_types().contains(&"read_file".to_string()));

    let info = agent.server_info();
    assert_eq!(info[0].tool_count, 2);
    assert_eq!(info[0].tool_names, vec!["read_file", "list_dir"]);

    let err = agent.connect_tool_server(server.clone()).unwrap_err();
    assert!(err.to_string().contains("already connected"));

    agent.disconnect_tool_server("fs").await.unwrap();
    assert!(!agent.is_connected("fs"));
    assert!(!agent.action_types().contains(&"read_file".to_string()));
    assert!(server.closed.load(Ordering::SeqCst));

    let err = agent.disconnect_tool_server("fs").await.unwrap_err();
    assert!(err.to_string().contains("Tool server not found"));
}

#[tokio::test]
async fn test_tool_server_collision_rolls_back() {
    let (agent, _, _) = agent_with(vec![]);
    agent
        .register_action(Arc::new(CountingAction::new("list_dir")))
        .unwrap();
    let server = Arc::new(FakeToolServer::new("fs", &["read_file", "list_dir"]));

    assert!(agent.connect_tool_server(server).is_err());
    assert!(!agent.is_connected("fs"));
    assert!(!agent.action_types().contains(&"read_file".to_string()));
}

#[tokio::test]
async fn test_close_cancels_tasks_and_browser() {
    let (agent, browser, _) = agent_with(vec![noop_forever()]);
    agent
        .register_action(Arc::new(CountingAction::new("noop")))
        .unwrap();
    agent
        .connect_tool_server(Arc::new(FakeToolServer::new("srv", &["t"])))
        .unwrap();

    let control = agent
        .execute_task_async("loop", TaskParams::new())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    agent.close().await.unwrap();
    assert_eq!(control.status(), TaskStatus::Cancelled);
    assert!(agent.server_ids().is_empty());
    assert!(browser.closed.load(Ordering::SeqCst));

    let output = control.wait().await.unwrap();
    assert_eq!(output.status, TaskStatus::Cancelled);
}
