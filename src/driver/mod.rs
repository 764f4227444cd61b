pub mod common;
pub mod traits;
pub mod web;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::HarnessResult;
pub use traits::{BrowserSession, ElementRef, Interaction, Lookup, RawAttribute, Selector};

/// Browser launch options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    /// Silence the browser's own console logging
    pub suppress_logs: bool,
    /// Viewport (width, height)
    pub window_size: (u32, u32),
    /// Passed to the browser in order, after the built-in flags
    pub extra_arguments: Vec<String>,
    /// Explicit browser binary; discovered from well-known paths when unset
    pub executable: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            suppress_logs: true,
            window_size: (1280, 900),
            extra_arguments: vec![
                "--disable-gpu".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            executable: None,
        }
    }
}

impl SessionConfig {
    /// Full browser argument list
    pub fn launch_args(&self) -> Vec<String> {
        let (width, height) = self.window_size;
        let mut args = vec![format!("--window-size={},{}", width, height)];
        if self.suppress_logs {
            args.push("--log-level=3".to_string());
            args.push("--disable-logging".to_string());
        }
        args.extend(self.extra_arguments.iter().cloned());
        args
    }
}

/// Starts browser sessions. The suite aggregator only ever talks to this,
/// so tests can substitute a scripted page.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn start(
        &self,
        base_url: &str,
        config: &SessionConfig,
    ) -> HarnessResult<Box<dyn BrowserSession>>;
}

/// Launches real Chromium sessions through Playwright
pub struct PlaywrightFactory;

#[async_trait]
impl SessionFactory for PlaywrightFactory {
    async fn start(
        &self,
        base_url: &str,
        config: &SessionConfig,
    ) -> HarnessResult<Box<dyn BrowserSession>> {
        let session = web::PlaywrightSession::start(base_url, config).await?;
        Ok(Box::new(session))
    }
}
