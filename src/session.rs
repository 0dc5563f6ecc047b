//! `webhands run`: build the agent from configuration and drive tasks.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use colored::Colorize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use webhands_actions_browser::{ActionFlags, builtin_actions};
use webhands_browser_cdp::{CdpBrowser, CdpBrowserConfig};
use webhands_config::{BrowserConfig, Config, ConfigLoader, ConfigValidator, LlmConfig};
use webhands_mcp_bridge::{McpServer, parse_server_configs};
use webhands_protocols::{ActionCall, AgentStep, TaskOutput, TaskStatus};
use webhands_provider_openai::OpenAIProvider;
use webhands_runtime::{AgentSettings, RetryConfig, TaskControl, TaskParams, WebAgent};

use crate::cli::RunArgs;
use crate::console::Console;
use crate::interaction::{Prompter, TerminalPrompter, UserInteractionAction};

/// Commands typed while a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ControlCommand {
    Pause,
    Resume,
    Cancel,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Some(Self::Pause),
            "r" | "resume" => Some(Self::Resume),
            "c" | "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

pub(crate) async fn run(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let mut config =
        ConfigLoader::load_or_default(config_path).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("{}: {}", warning.path, warning.message);
    }

    let llm = Arc::new(build_provider(&config.llm)?);
    let browser = Arc::new(CdpBrowser::new(browser_config(&config.browser)));

    let (console, commands) = Console::stdin();
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter::new(console));

    let flags = ActionFlags::default().with_pdf_analysis(config.actions.pdf_analysis);
    let agent = WebAgent::new(llm, browser, agent_settings(&config))
        .with_actions(builtin_actions(&flags))?;
    agent.register_action(Arc::new(UserInteractionAction::new(prompter.clone())))?;
    let agent = Arc::new(agent);

    println!("{}", "webhands".blue().bold());
    println!(
        "Type {} to pause, {} to resume and {} to cancel the running task.\n",
        "pause".bold(),
        "resume".bold(),
        "cancel".bold()
    );

    let result: Result<()> = async {
        if let Some(path) = &args.mcp {
            connect_mcp_servers(&agent, path, args.debug).await?;
        }
        let goal = match (&args.command, &args.file) {
            (Some(command), _) => command.clone(),
            (None, Some(file)) => tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read task file {}", file.display()))?,
            (None, None) => prompter.input("What should webhands do for you today?").await?,
        };
        drive(&agent, goal, prompter.as_ref(), commands, args.debug).await
    }
    .await;

    if let Err(e) = agent.close().await {
        warn!("Error during shutdown: {}", e);
    }
    result
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if args.debug {
        config.agent.debug = true;
    }
    if let Some(max_steps) = args.max_steps {
        config.agent.max_steps = Some(max_steps);
    }
}

fn build_provider(llm: &LlmConfig) -> Result<OpenAIProvider> {
    if llm.provider != "openai" {
        bail!("Unsupported LLM provider: {}", llm.provider);
    }
    let api_key = llm.resolve_api_key()?;
    Ok(OpenAIProvider::new(api_key, &llm.model)
        .with_base_url(&llm.base_url)
        .with_temperature(llm.temperature))
}

fn browser_config(browser: &BrowserConfig) -> CdpBrowserConfig {
    CdpBrowserConfig {
        endpoint: browser.endpoint.clone(),
        debug_port: browser.debug_port,
        headless: browser.headless,
        launch: browser.launch,
        executable: browser.executable.clone(),
        profile_dir: browser.profile_dir.clone(),
        viewport_width: browser.viewport_width,
        viewport_height: browser.viewport_height,
    }
}

fn agent_settings(config: &Config) -> AgentSettings {
    let mut settings = AgentSettings {
        max_steps: config.agent.max_steps,
        token_limit: config.agent.token_limit,
        settle_delay: config.agent.settle_delay(),
        stop_on_complete: config.agent.stop_on_complete,
        debug: config.agent.debug,
        debug_dir: config.agent.debug_dir.clone(),
        retry: RetryConfig::new(config.retry.attempts, config.retry.base_delay()),
        ..AgentSettings::default()
    };
    settings.snapshot.viewport_only = config.agent.viewport_only;
    settings.snapshot.highlight = config.agent.highlight;
    settings
}

async fn connect_mcp_servers(agent: &WebAgent, path: &Path, debug: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read MCP config {}", path.display()))?;
    let configs = parse_server_configs(&content)
        .with_context(|| format!("Invalid MCP config {}", path.display()))?;

    for config in configs {
        let server = McpServer::connect(config, debug)
            .await
            .context("Failed to connect to MCP server")?;
        let id = agent.connect_tool_server(Arc::new(server))?;
        info!("Connected to MCP server {}", id);
    }
    Ok(())
}

fn task_params(agent: &Arc<WebAgent>, debug: bool) -> TaskParams {
    let on_step_agent = agent.clone();
    let params = TaskParams::new().on_step(move |step| {
        println!("{}", format_step(step, |call| on_step_agent.pprint_action(call)));
    });

    if !debug {
        return params;
    }
    let planned_agent = agent.clone();
    params.debug_on_agent_output(move |output| {
        let planned: Vec<String> = output
            .actions
            .iter()
            .map(|call| format!("{} {}", call.action_type, planned_agent.pprint_action(call)))
            .collect();
        println!("{} {}", "planned:".dimmed(), planned.join(", ").dimmed());
    })
}

async fn drive(
    agent: &Arc<WebAgent>,
    mut goal: String,
    prompter: &dyn Prompter,
    mut commands: mpsc::UnboundedReceiver<String>,
    debug: bool,
) -> Result<()> {
    loop {
        let control = agent
            .execute_task_async(&goal, task_params(agent, debug))
            .await?;
        info!("Started task {}", control.id());

        let output = supervise(&control, &mut commands).await?;
        println!("\n{}", format_output(&output));

        if !prompter.confirm("Would you like to continue?").await? {
            return Ok(());
        }
        goal = prompter.input("What should webhands do next for you?").await?;
    }
}

/// Wait for the task while applying control commands. A task error ends the
/// session.
async fn supervise(
    control: &TaskControl,
    commands: &mut mpsc::UnboundedReceiver<String>,
) -> Result<TaskOutput> {
    let mut errors = control.subscribe_errors();
    let wait = control.wait();
    tokio::pin!(wait);

    loop {
        tokio::select! {
            output = &mut wait => {
                let output = output?;
                if output.status == TaskStatus::Failed {
                    let error = output.error.clone().unwrap_or_else(|| "Task failed".to_string());
                    return Err(anyhow!(error));
                }
                return Ok(output);
            }
            Ok(error) = errors.recv() => {
                control.cancel();
                return Err(anyhow!(error));
            }
            Some(line) = commands.recv() => apply_command(control, &line),
        }
    }
}

fn apply_command(control: &TaskControl, line: &str) {
    let Some(command) = ControlCommand::parse(line) else {
        if !line.trim().is_empty() {
            println!("Unknown command {:?}; use pause, resume or cancel.", line.trim());
        }
        return;
    };

    match command {
        ControlCommand::Pause => {
            if control.pause() == TaskStatus::Paused {
                println!(
                    "⏸ {}",
                    "webhands will pause after completing this operation. Type resume to continue."
                        .blue()
                );
            }
        }
        ControlCommand::Resume => {
            if control.resume() == TaskStatus::Running {
                println!("⏵ {}", "webhands will resume".blue());
            }
        }
        ControlCommand::Cancel => {
            control.cancel();
            println!("{}", "Cancelling task".yellow());
        }
    }
}

pub(crate) fn format_step(step: &AgentStep, pprint: impl Fn(&ActionCall) -> String) -> String {
    let count = step.agent_output.actions.len();
    let lines: Vec<String> = step
        .agent_output
        .actions
        .iter()
        .zip(step.action_outputs.iter())
        .enumerate()
        .map(|(i, (call, outcome))| {
            let branch = if i + 1 < count { "├──" } else { "└──" };
            if outcome.success {
                format!("  {} [{}] {}", branch, call.action_type.yellow(), pprint(call))
            } else {
                format!(
                    "  {} [{}] {}",
                    branch,
                    call.action_type.red(),
                    outcome.message.red()
                )
            }
        })
        .collect();

    let mut text = format!("[{}]: {}", "task".yellow(), step.agent_output.next_goal);
    if !lines.is_empty() {
        text.push('\n');
        text.push_str(&lines.join("\n"));
    }
    text
}

fn format_output(output: &TaskOutput) -> String {
    let body = output.output.as_deref().unwrap_or("No Response");
    format!(
        "{}\n{}\n{}",
        format!("── webhands response ({}) ──", output.status).yellow(),
        body,
        "──".yellow()
    )
}
