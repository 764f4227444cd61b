//! Browser session backed by Playwright
//!
//! Launches Chromium through the Playwright driver and implements
//! [`BrowserSession`] on top of a single page.

use anyhow::{Context, Result};
use async_trait::async_trait;
use playwright::api::{Browser, BrowserContext, BrowserType, Page, Viewport};
use playwright::Playwright;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::driver::common::resolve_url;
use crate::driver::traits::{BrowserSession, ElementRef, Interaction, RawAttribute, Selector};
use crate::driver::SessionConfig;
use crate::error::{HarnessError, HarnessResult};

const CURRENT_URL_JS: &str = "() => window.location.href";

const BODY_TEXT_JS: &str = "() => document.body ? document.body.innerText : ''";

const VALIDATION_MESSAGES_JS: &str = r#"
() => Array.from(document.querySelectorAll(':invalid'))
    .map(el => el.validationMessage || '')
    .filter(msg => msg.length > 0)
"#;

const FOCUS_JS: &str = r#"
(els, index) => {
    const el = els[index];
    if (!el) return false;
    el.scrollIntoView({ block: 'center' });
    el.focus();
    return true;
}
"#;

const RAW_ATTRIBUTE_JS: &str = r#"
(els, arg) => {
    const el = els[arg.index];
    if (!el) return false;
    switch (arg.op) {
        case 'remove':
            el.removeAttribute(arg.name);
            break;
        case 'set':
            el.setAttribute(arg.name, arg.value);
            break;
        case 'force':
            el.removeAttribute('min');
            el.value = arg.value;
            el.dispatchEvent(new Event('input', { bubbles: true }));
            el.dispatchEvent(new Event('change', { bubbles: true }));
            break;
    }
    return true;
}
"#;

const CLEAR_STORAGE_JS: &str = "() => { localStorage.clear(); sessionStorage.clear(); }";

/// One Chromium browser with a single page
pub struct PlaywrightSession {
    #[allow(dead_code)]
    playwright: Playwright,
    browser: Browser,
    context: BrowserContext,
    page: Mutex<Page>,
    base_url: String,
    closed: AtomicBool,
}

impl PlaywrightSession {
    /// Launch a browser configured by `config`. Every failure maps to
    /// [`HarnessError::Launch`].
    pub async fn start(base_url: &str, config: &SessionConfig) -> HarnessResult<Self> {
        Self::launch(base_url, config)
            .await
            .map_err(HarnessError::Launch)
    }

    async fn launch(base_url: &str, config: &SessionConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let chromium = playwright.chromium();
        let browser = launch_chromium_browser(&chromium, config).await?;

        let context = browser
            .context_builder()
            .build()
            .await
            .context("Failed to create browser context")?;
        let page = context
            .new_page()
            .await
            .context("Failed to open page")?;

        let (width, height) = config.window_size;
        page.set_viewport_size(Viewport {
            width: width as i32,
            height: height as i32,
        })
        .await
        .context("Failed to set viewport size")?;

        log::info!(
            "Browser session started (headless: {}, window: {}x{})",
            config.headless,
            width,
            height
        );

        Ok(Self {
            playwright,
            browser,
            context,
            page: Mutex::new(page),
            base_url: base_url.trim_end_matches('/').to_string(),
            closed: AtomicBool::new(false),
        })
    }

    async fn element_count(&self, selector: &Selector) -> HarnessResult<usize> {
        let page = self.page.lock().await;
        let handles = page
            .query_selector_all(&selector.to_driver_selector())
            .await
            .with_context(|| format!("Failed to query {}", selector))?;
        Ok(handles.len())
    }

    /// Run `js` against the `index`-th match of `element`'s selector.
    /// Returns `false` when that match no longer exists.
    async fn eval_on_element(&self, element: &ElementRef, js: &str, arg: serde_json::Value) -> HarnessResult<bool> {
        let page = self.page.lock().await;
        let sel = element.selector.to_driver_selector();
        let found: bool = page
            .evaluate_on_selector_all::<serde_json::Value, bool>(&sel, js, Some(arg))
            .await
            .with_context(|| format!("Script failed on {}", element.selector))?;
        Ok(found)
    }

    fn gone(element: &ElementRef) -> HarnessError {
        HarnessError::ElementNotFound(format!("{} (match #{})", element.selector, element.index))
    }
}

#[async_trait]
impl BrowserSession for PlaywrightSession {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn navigate(&self, url: &str) -> HarnessResult<()> {
        let full_url = resolve_url(&self.base_url, url);
        log::info!("Navigating to {}", full_url);

        let page = self.page.lock().await;
        page.goto_builder(&full_url)
            .goto()
            .await
            .map_err(|e| HarnessError::Navigation {
                url: full_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        let page = self.page.lock().await;
        let url: String = page
            .evaluate::<(), String>(CURRENT_URL_JS, ())
            .await
            .context("Failed to read current URL")?;
        Ok(url)
    }

    async fn locate(&self, selector: &Selector) -> HarnessResult<Vec<ElementRef>> {
        let count = self.element_count(selector).await?;
        Ok((0..count)
            .map(|index| ElementRef {
                selector: selector.clone(),
                index,
            })
            .collect())
    }

    async fn interact(&self, element: &ElementRef, action: &Interaction) -> HarnessResult<()> {
        log::debug!("{} on {} #{}", action, element.selector, element.index);

        match action {
            Interaction::Click | Interaction::ClearValue => {
                let page = self.page.lock().await;
                let handles = page
                    .query_selector_all(&element.selector.to_driver_selector())
                    .await
                    .with_context(|| format!("Failed to query {}", element.selector))?;
                let handle = handles.get(element.index).ok_or_else(|| Self::gone(element))?;

                if *action == Interaction::Click {
                    handle
                        .click_builder()
                        .click()
                        .await
                        .with_context(|| format!("Failed to click {}", element.selector))?;
                } else {
                    handle
                        .fill_builder("")
                        .fill()
                        .await
                        .with_context(|| format!("Failed to clear {}", element.selector))?;
                }
            }
            Interaction::TypeText(text) => {
                if !self.eval_on_element(element, FOCUS_JS, json!(element.index)).await? {
                    return Err(Self::gone(element));
                }
                let page = self.page.lock().await;
                page.keyboard
                    .input_text(text)
                    .await
                    .with_context(|| format!("Failed to type into {}", element.selector))?;
            }
            Interaction::SetAttributeRaw(raw) => {
                let arg = match raw {
                    RawAttribute::Remove(name) => {
                        json!({ "index": element.index, "op": "remove", "name": name })
                    }
                    RawAttribute::Set(name, value) => {
                        json!({ "index": element.index, "op": "set", "name": name, "value": value })
                    }
                    RawAttribute::ForceValue(value) => {
                        json!({ "index": element.index, "op": "force", "value": value })
                    }
                };
                if !self.eval_on_element(element, RAW_ATTRIBUTE_JS, arg).await? {
                    return Err(Self::gone(element));
                }
            }
        }
        Ok(())
    }

    async fn element_text(&self, element: &ElementRef) -> HarnessResult<String> {
        let page = self.page.lock().await;
        let handles = page
            .query_selector_all(&element.selector.to_driver_selector())
            .await
            .with_context(|| format!("Failed to query {}", element.selector))?;
        let handle = handles.get(element.index).ok_or_else(|| Self::gone(element))?;
        let text = handle
            .inner_text()
            .await
            .with_context(|| format!("Failed to read text of {}", element.selector))?;
        Ok(text)
    }

    async fn validation_messages(&self) -> HarnessResult<Vec<String>> {
        let page = self.page.lock().await;
        let messages: Vec<String> = page
            .evaluate::<(), Vec<String>>(VALIDATION_MESSAGES_JS, ())
            .await
            .context("Failed to read validation messages")?;
        Ok(messages)
    }

    async fn body_text(&self) -> HarnessResult<String> {
        let page = self.page.lock().await;
        let text: String = page
            .evaluate::<(), String>(BODY_TEXT_JS, ())
            .await
            .context("Failed to read body text")?;
        Ok(text)
    }

    async fn clear_cookies(&self) -> HarnessResult<()> {
        self.context
            .clear_cookies()
            .await
            .context("Failed to clear cookies")?;
        let page = self.page.lock().await;
        page.evaluate::<(), ()>(CLEAR_STORAGE_JS, ())
            .await
            .context("Failed to clear web storage")?;
        Ok(())
    }

    async fn close(&self) -> HarnessResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        log::info!("Browser session closed");
        Ok(())
    }
}

async fn launch_chromium_browser(chromium: &BrowserType, config: &SessionConfig) -> Result<Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    let executable = config.executable.clone().or_else(find_system_browser);
    if let Some(ref path) = executable {
        log::info!("Using browser executable: {}", path.display());
        launcher = launcher.executable(path);
    } else {
        log::info!("No browser executable configured, using the Playwright default");
    }

    let args = config.launch_args();
    launcher = launcher.args(&args);

    launcher
        .launch()
        .await
        .context("Failed to launch Chromium (is the browser installed?)")
}

fn find_system_browser() -> Option<PathBuf> {
    let common_paths = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    common_paths
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}
