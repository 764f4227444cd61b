//! Scripted in-memory page used by the unit tests
//!
//! Models just enough of a browser for the poller and runner: a URL, element
//! counts per selector, text that appears at a scheduled time, field values,
//! `required` constraints with native validation, and click hooks.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::common::resolve_url;
use crate::driver::traits::{BrowserSession, ElementRef, Interaction, RawAttribute, Selector};
use crate::driver::{SessionConfig, SessionFactory};
use crate::error::{HarnessError, HarnessResult};

pub const NATIVE_REQUIRED_MESSAGE: &str = "Please fill out this field.";

type Hook = Arc<dyn Fn(&mut FakeState) + Send + Sync>;

#[derive(Default)]
pub struct FakeState {
    pub url: String,
    texts: Vec<(String, Instant)>,
    elements: HashMap<Selector, usize>,
    pub values: HashMap<Selector, String>,
    pub element_texts: HashMap<Selector, String>,
    pub required: HashSet<Selector>,
    pub validation: Option<String>,
    click_hooks: HashMap<Selector, Hook>,
    navigate_hooks: HashMap<String, Hook>,
    pub failing_paths: HashSet<String>,
    pub panicking_paths: HashSet<String>,
    pub interactions: Vec<String>,
    pub navigations: Vec<String>,
    pub text_checks: usize,
    pub cookie_clears: usize,
    pub closes: usize,
}

impl FakeState {
    /// Make `text` visible `after` from now
    pub fn show_text_after(&mut self, text: &str, after: Duration) {
        self.texts.push((text.to_string(), Instant::now() + after));
    }

    pub fn show_text(&mut self, text: &str) {
        self.show_text_after(text, Duration::ZERO);
    }

    pub fn set_element(&mut self, selector: Selector, count: usize) {
        self.elements.insert(selector, count);
    }

    pub fn value(&self, selector: &Selector) -> &str {
        self.values.get(selector).map(String::as_str).unwrap_or("")
    }

    fn visible_texts(&self) -> impl Iterator<Item = &str> {
        let now = Instant::now();
        self.texts
            .iter()
            .filter(move |(_, at)| *at <= now)
            .map(|(t, _)| t.as_str())
    }

    fn count(&self, selector: &Selector) -> usize {
        match selector {
            Selector::TextContains(needle) => {
                let needle = needle.split_whitespace().collect::<Vec<_>>().join(" ");
                self.visible_texts().filter(|t| t.contains(&needle)).count()
            }
            other => self.elements.get(other).copied().unwrap_or(0),
        }
    }
}

/// Handle to a shared [`FakeState`]; clones observe the same page
#[derive(Clone)]
pub struct FakePage {
    base_url: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn on_click<F>(&self, selector: Selector, hook: F)
    where
        F: Fn(&mut FakeState) + Send + Sync + 'static,
    {
        self.state().click_hooks.insert(selector, Arc::new(hook));
    }

    /// Run `hook` whenever a URL ending in `path` is loaded
    pub fn on_navigate<F>(&self, path: &str, hook: F)
    where
        F: Fn(&mut FakeState) + Send + Sync + 'static,
    {
        self.state()
            .navigate_hooks
            .insert(path.to_string(), Arc::new(hook));
    }

    /// Register a form: clicking `submit` is blocked natively while any
    /// still-`required` field is empty, otherwise `on_submit` runs.
    pub fn form<F>(&self, submit: Selector, fields: &[(Selector, bool)], on_submit: F)
    where
        F: Fn(&mut FakeState) + Send + Sync + 'static,
    {
        {
            let mut state = self.state();
            state.set_element(submit.clone(), 1);
            for (field, required) in fields {
                state.set_element(field.clone(), 1);
                if *required {
                    state.required.insert(field.clone());
                }
            }
        }
        self.on_click(submit, move |state| {
            let blocked = state
                .required
                .iter()
                .any(|field| state.value(field).is_empty());
            if blocked {
                state.validation = Some(NATIVE_REQUIRED_MESSAGE.to_string());
            } else {
                state.validation = None;
                on_submit(state);
            }
        });
    }
}

#[async_trait]
impl BrowserSession for FakePage {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn navigate(&self, url: &str) -> HarnessResult<()> {
        let full = resolve_url(&self.base_url, url);
        let hook = {
            let mut state = self.state();
            state.navigations.push(full.clone());
            if state.panicking_paths.iter().any(|p| full.ends_with(p.as_str())) {
                drop(state);
                panic!("scripted fault while loading {}", full);
            }
            if state.failing_paths.iter().any(|p| full.ends_with(p.as_str())) {
                return Err(HarnessError::Navigation {
                    url: full,
                    reason: "net::ERR_CONNECTION_REFUSED".to_string(),
                });
            }
            state.url = full.clone();
            state.validation = None;
            state
                .navigate_hooks
                .iter()
                .find(|(path, _)| full.ends_with(path.as_str()))
                .map(|(_, hook)| hook.clone())
        };
        if let Some(hook) = hook {
            let mut state = self.state();
            hook(&mut *state);
        }
        Ok(())
    }

    async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.state().url.clone())
    }

    async fn locate(&self, selector: &Selector) -> HarnessResult<Vec<ElementRef>> {
        let mut state = self.state();
        if matches!(selector, Selector::TextContains(_)) {
            state.text_checks += 1;
        }
        let count = state.count(selector);
        Ok((0..count)
            .map(|index| ElementRef {
                selector: selector.clone(),
                index,
            })
            .collect())
    }

    async fn interact(&self, element: &ElementRef, action: &Interaction) -> HarnessResult<()> {
        let hook = {
            let mut state = self.state();
            if element.index >= state.count(&element.selector) {
                return Err(HarnessError::ElementNotFound(element.selector.to_string()));
            }
            state
                .interactions
                .push(format!("{} {}", action, element.selector));

            let sel = element.selector.clone();
            match action {
                Interaction::Click => state.click_hooks.get(&sel).cloned(),
                Interaction::ClearValue => {
                    state.values.insert(sel, String::new());
                    None
                }
                Interaction::TypeText(text) => {
                    state.values.entry(sel).or_default().push_str(text);
                    None
                }
                Interaction::SetAttributeRaw(RawAttribute::Remove(name)) => {
                    if name == "required" {
                        state.required.remove(&sel);
                    }
                    None
                }
                Interaction::SetAttributeRaw(RawAttribute::Set(name, value)) => {
                    if name == "value" {
                        state.values.insert(sel, value.clone());
                    }
                    None
                }
                Interaction::SetAttributeRaw(RawAttribute::ForceValue(value)) => {
                    state.values.insert(sel, value.clone());
                    None
                }
            }
        };
        if let Some(hook) = hook {
            let mut state = self.state();
            hook(&mut *state);
        }
        Ok(())
    }

    async fn element_text(&self, element: &ElementRef) -> HarnessResult<String> {
        let state = self.state();
        if element.index >= state.count(&element.selector) {
            return Err(HarnessError::ElementNotFound(element.selector.to_string()));
        }
        Ok(state
            .element_texts
            .get(&element.selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn validation_messages(&self) -> HarnessResult<Vec<String>> {
        Ok(self.state().validation.clone().into_iter().collect())
    }

    async fn body_text(&self) -> HarnessResult<String> {
        let state = self.state();
        Ok(state.visible_texts().collect::<Vec<_>>().join("\n"))
    }

    async fn clear_cookies(&self) -> HarnessResult<()> {
        self.state().cookie_clears += 1;
        Ok(())
    }

    async fn close(&self) -> HarnessResult<()> {
        self.state().closes += 1;
        Ok(())
    }
}

/// Factory handing out one shared fake page, counting launches
pub struct FakeFactory {
    pub page: FakePage,
    pub starts: Arc<Mutex<usize>>,
    pub fail_launch: bool,
}

impl FakeFactory {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            starts: Arc::new(Mutex::new(0)),
            fail_launch: false,
        }
    }

    pub fn starts(&self) -> usize {
        *self.starts.lock().expect("counter poisoned")
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn start(
        &self,
        _base_url: &str,
        _config: &SessionConfig,
    ) -> HarnessResult<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(HarnessError::Launch(anyhow::anyhow!(
                "chromium executable not found"
            )));
        }
        *self.starts.lock().expect("counter poisoned") += 1;
        Ok(Box::new(self.page.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_raw_attribute_writes() {
        let page = FakePage::new("http://localhost:5173");
        let date = Selector::id("date");
        page.state().set_element(date.clone(), 1);
        page.state().required.insert(date.clone());
        let el = page.locate_first(&date).await.unwrap().required(&date).unwrap();

        let set = Interaction::SetAttributeRaw(RawAttribute::Set(
            "value".to_string(),
            "2026-11-02T18:30".to_string(),
        ));
        assert_eq!(set.to_string(), "set attribute value=\"2026-11-02T18:30\"");
        page.interact(&el, &set).await.unwrap();
        page.interact(
            &el,
            &Interaction::SetAttributeRaw(RawAttribute::Remove("required".to_string())),
        )
        .await
        .unwrap();

        let state = page.state();
        assert_eq!(state.value(&date), "2026-11-02T18:30");
        assert!(!state.required.contains(&date));
        assert_eq!(
            state.interactions,
            vec![
                "set attribute value=\"2026-11-02T18:30\" #date",
                "remove attribute required #date"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_element_text_of_vanished_match() {
        let page = FakePage::new("http://localhost:5173");
        let heading = Selector::css("h1");
        let el = ElementRef {
            selector: heading.clone(),
            index: 0,
        };
        assert!(matches!(
            page.element_text(&el).await,
            Err(HarnessError::ElementNotFound(_))
        ));

        page.state().set_element(heading.clone(), 1);
        page.state()
            .element_texts
            .insert(heading, "Spring Career Fair".to_string());
        assert_eq!(page.element_text(&el).await.unwrap(), "Spring Career Fair");
    }
}
