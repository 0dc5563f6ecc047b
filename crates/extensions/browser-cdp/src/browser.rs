//! Lazily connected browser provider.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};
use webhands_protocols::{BrowserPage, BrowserProvider, PageError};

use crate::cdp::{CdpClient, CdpError};
use crate::page::CdpPage;

const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_POLL: Duration = Duration::from_millis(200);

/// Browser connection settings.
#[derive(Debug, Clone)]
pub struct CdpBrowserConfig {
    /// DevTools HTTP endpoint. Overrides `debug_port` when set.
    pub endpoint: Option<String>,
    pub debug_port: u16,
    pub headless: bool,
    /// Start a browser when nothing answers on the endpoint.
    pub launch: bool,
    /// Browser binary. Searched in well-known locations when unset.
    pub executable: Option<PathBuf>,
    /// User data directory. Default: ~/.webhands/browser-profile
    pub profile_dir: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for CdpBrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            debug_port: 9222,
            headless: false,
            launch: true,
            executable: None,
            profile_dir: None,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl CdpBrowserConfig {
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.debug_port),
        }
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".webhands")
                .join("browser-profile")
        })
    }

    /// Launch arguments, excluding the executable.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", self.profile_dir().display()),
            format!(
                "--window-size={},{}",
                self.viewport_width, self.viewport_height
            ),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args.push("about:blank".to_string());
        args
    }
}

/// Find a Chromium-family executable in the usual install locations.
pub fn find_browser_executable() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    let paths: &[&str] = &[
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    ];

    #[cfg(target_os = "windows")]
    let paths: &[&str] = &[
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    ];

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let paths: &[&str] = &[
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
    ];

    paths.iter().map(PathBuf::from).find(|p| p.exists())
}

/// Browser provider that connects (or launches) on first use.
pub struct CdpBrowser {
    config: CdpBrowserConfig,
    client: Mutex<Option<Arc<CdpClient>>>,
    /// Browser process, if this provider started it.
    process: Mutex<Option<Child>>,
}

impl CdpBrowser {
    pub fn new(config: CdpBrowserConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
            process: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CdpBrowserConfig {
        &self.config
    }

    async fn is_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn launch(&self) -> Result<Child, CdpError> {
        let executable = self
            .config
            .executable
            .clone()
            .or_else(find_browser_executable)
            .ok_or(CdpError::ExecutableNotFound)?;

        let profile_dir = self.config.profile_dir();
        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!(
            "Launching {} with profile at {}",
            executable.display(),
            profile_dir.display()
        );

        let child = Command::new(&executable)
            .args(self.config.launch_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

        info!("Browser launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Connect, launching the browser first when allowed and needed.
    pub async fn connect(&self) -> Result<Arc<CdpClient>, CdpError> {
        let mut client = self.client.lock().await;
        if let Some(client) = client.as_ref() {
            return Ok(client.clone());
        }

        let endpoint = self.config.endpoint();
        if self.config.launch && self.config.endpoint.is_none() && !self.is_running().await {
            info!(
                "No browser on port {}, launching...",
                self.config.debug_port
            );
            let child = self.launch().await?;
            *self.process.lock().await = Some(child);

            let mut ready = false;
            for _ in 0..STARTUP_ATTEMPTS {
                tokio::time::sleep(STARTUP_POLL).await;
                if self.is_running().await {
                    ready = true;
                    break;
                }
            }
            if !ready {
                return Err(CdpError::LaunchFailed(
                    "Browser failed to start within timeout".to_string(),
                ));
            }
        }

        let connected = Arc::new(CdpClient::connect(&endpoint).await?);
        info!("Connected to {} at {}", connected.browser(), endpoint);
        *client = Some(connected.clone());
        Ok(connected)
    }
}

#[async_trait]
impl BrowserProvider for CdpBrowser {
    fn id(&self) -> &str {
        "cdp"
    }

    async fn new_page(&self) -> Result<Arc<dyn BrowserPage>, PageError> {
        let client = self.connect().await?;
        let session = client.new_page().await?;
        session
            .set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await?;
        Ok(Arc::new(CdpPage::new(client, session)))
    }

    async fn close(&self) -> Result<(), PageError> {
        self.client.lock().await.take();
        if let Some(mut child) = self.process.lock().await.take() {
            info!("Shutting down browser");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop browser process: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
