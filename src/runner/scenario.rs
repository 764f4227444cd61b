//! Scenario runner
//!
//! A scenario is an ordered list of steps (navigate, fill, submit, observe,
//! ...) executed against one browser session. The runner never lets a step
//! failure escape: errors and panics alike become a failed [`Verdict`].

use chrono::Local;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::Instant;

use super::poller::{
    poll, wait_for_any_text, wait_for_element, wait_for_state, PageState, PollSettings, Probe,
    Recognizer,
};
use super::state::Verdict;
use crate::driver::common::{contains_any_ignore_case, normalize_future_datetime, snippet};
use crate::driver::traits::{BrowserSession, Interaction, Lookup, RawAttribute, Selector};
use crate::error::{HarnessError, HarnessResult};
use crate::utils::config::HarnessConfig;

/// Value for one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// `datetime-local` value, forced past the native picker
    DateTime(String),
    Empty,
}

/// One submission attempt: ordered field values plus the validation mode.
///
/// With `preserve_required` an empty field keeps its `required` attribute so
/// the browser's own validation fires; without it the constraint is stripped
/// so the submission reaches the application's validation instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    fields: Vec<(Selector, FieldValue)>,
    preserve_required: bool,
}

impl FormSpec {
    pub fn new(preserve_required: bool) -> Self {
        Self {
            fields: Vec::new(),
            preserve_required,
        }
    }

    /// Text field by element id; an empty value means "leave empty"
    pub fn text(self, id: &str, value: &str) -> Self {
        let value = if value.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(value.to_string())
        };
        self.field(Selector::id(id), value)
    }

    /// Date/time field by element id; an empty value means "leave empty"
    pub fn datetime(self, id: &str, value: &str) -> Self {
        let value = if value.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::DateTime(value.to_string())
        };
        self.field(Selector::id(id), value)
    }

    pub fn field(mut self, selector: Selector, value: FieldValue) -> Self {
        self.fields.push((selector, value));
        self
    }

    pub fn fields(&self) -> &[(Selector, FieldValue)] {
        &self.fields
    }

    pub fn preserve_required(&self) -> bool {
        self.preserve_required
    }
}

/// What counts as success after an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expectation {
    /// Any of these texts (or a native validation message containing one)
    pub accept: Vec<String>,
    /// Texts that explain a failure when nothing accepted shows up
    pub reject: Vec<String>,
    /// A URL matching this probe also counts as success
    pub url: Option<Probe>,
    /// Overrides the toast timeout
    pub timeout: Option<Duration>,
}

impl Expectation {
    pub fn texts(accept: &[&str]) -> Self {
        Self {
            accept: accept.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn text(accept: &str) -> Self {
        Self::texts(&[accept])
    }

    /// Success also when the URL contains `fragment`
    pub fn or_url(mut self, fragment: &str) -> Self {
        self.url = Some(Probe::UrlContains(fragment.to_string()));
        self
    }

    /// Success also when the browser lands exactly on `target`
    pub fn or_landing(mut self, target: &str) -> Self {
        self.url = Some(Probe::UrlEquals(target.to_string()));
        self
    }

    pub fn rejecting(mut self, reject: &[&str]) -> Self {
        self.reject = reject.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn within(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Whether a missing element is a failure or a reason to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Missing ends the scenario as skipped
    Optional { skip_reason: String },
    /// Missing is ignored and the scenario continues
    IfPresent,
}

impl Presence {
    pub fn optional(skip_reason: &str) -> Self {
        Presence::Optional {
            skip_reason: skip_reason.to_string(),
        }
    }
}

/// Recognizers deciding whether a page is ready for form interaction
#[derive(Debug, Clone)]
pub struct Readiness {
    pub recognizers: Vec<Recognizer>,
    pub timeout: Option<Duration>,
}

impl Readiness {
    pub fn new(recognizers: Vec<Recognizer>) -> Self {
        Self {
            recognizers,
            timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Load a path (relative to the base URL) or absolute URL
    Navigate(String),
    /// Follow an in-app link when present, else load `fallback`
    Open { link: Selector, fallback: String },
    /// Poll until the page is [`PageState::FormReady`]; any other state fails
    AwaitState(Readiness),
    FillForm(FormSpec),
    /// Click the submit control and capture native validation
    Submit(Selector),
    Observe(Expectation),
    Click { target: Selector, presence: Presence },
    ExpectElement { target: Selector, timeout: Option<Duration> },
    /// Remember the trimmed text of the first `target` match
    Capture { target: Selector, presence: Presence },
    /// Wait for a `target` match whose text matches the captured text
    ExpectCaptured { target: Selector, timeout: Option<Duration> },
    ClearCookies,
    /// Fixed sleep, for pages with no observable settle signal
    Pause(Duration),
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Navigate(_) => "navigate",
            Step::Open { .. } => "open",
            Step::AwaitState(_) => "await page state",
            Step::FillForm(_) => "fill form",
            Step::Submit(_) => "submit",
            Step::Observe(_) => "observe",
            Step::Click { .. } => "click",
            Step::ExpectElement { .. } => "expect element",
            Step::Capture { .. } => "capture text",
            Step::ExpectCaptured { .. } => "expect captured text",
            Step::ClearCookies => "clear cookies",
            Step::Pause(_) => "pause",
        }
    }
}

/// A named end-to-end test case
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }
}

/// Result of clicking submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Submitted,
    /// Native validation stopped the submission
    Blocked { message: String },
}

enum StepFlow {
    Next,
    Skip(String),
    Fail(String),
}

enum Finish {
    Passed(String),
    Skipped(String),
    Failed(String),
}

#[derive(Default)]
struct RunState {
    submission: Option<Submission>,
    evidence: Option<String>,
    captured: Option<String>,
}

/// Executes scenarios against a session
pub struct ScenarioRunner<'a> {
    config: &'a HarnessConfig,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self { config }
    }

    /// Run one scenario to a verdict. Never fails, never panics.
    pub async fn run(&self, session: &dyn BrowserSession, scenario: &Scenario) -> Verdict {
        let start = Instant::now();
        log::info!("Running scenario '{}'", scenario.name);

        let outcome = AssertUnwindSafe(self.execute(session, scenario))
            .catch_unwind()
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Finish::Passed(detail)) => Verdict::passed(&scenario.name, detail, duration_ms),
            Ok(Finish::Skipped(reason)) => Verdict::skipped(&scenario.name, reason, duration_ms),
            Ok(Finish::Failed(detail)) => Verdict::failed(&scenario.name, detail, duration_ms),
            Err(panic) => Verdict::failed(
                &scenario.name,
                format!("internal fault: {}", panic_message(panic.as_ref())),
                duration_ms,
            ),
        }
    }

    async fn execute(&self, session: &dyn BrowserSession, scenario: &Scenario) -> Finish {
        let mut state = RunState::default();

        for (index, step) in scenario.steps.iter().enumerate() {
            log::debug!("[{}] step {}: {}", scenario.name, index + 1, step.kind());
            match self.execute_step(session, step, &mut state).await {
                Ok(StepFlow::Next) => {}
                Ok(StepFlow::Skip(reason)) => return Finish::Skipped(reason),
                Ok(StepFlow::Fail(detail)) => return Finish::Failed(detail),
                Err(e) => {
                    return Finish::Failed(format!("step {} ({}): {}", index + 1, step.kind(), e))
                }
            }
        }

        Finish::Passed(
            state
                .evidence
                .unwrap_or_else(|| format!("all {} steps completed", scenario.steps.len())),
        )
    }

    async fn execute_step(
        &self,
        session: &dyn BrowserSession,
        step: &Step,
        state: &mut RunState,
    ) -> HarnessResult<StepFlow> {
        match step {
            Step::Navigate(path) => {
                session.navigate(path).await?;
                Ok(StepFlow::Next)
            }
            Step::Open { link, fallback } => {
                match session.locate_first(link).await? {
                    Lookup::Found(el) => {
                        log::info!("Following {}", link);
                        session.interact(&el, &Interaction::Click).await?;
                    }
                    Lookup::NotFound => {
                        log::info!("{} not found, loading {} directly", link, fallback);
                        session.navigate(fallback).await?;
                    }
                }
                Ok(StepFlow::Next)
            }
            Step::AwaitState(readiness) => self.await_ready(session, readiness).await,
            Step::FillForm(form) => {
                self.fill_form(session, form).await?;
                Ok(StepFlow::Next)
            }
            Step::Submit(control) => {
                let submission = self.submit(session, control).await?;
                if let Submission::Blocked { ref message } = submission {
                    log::info!("Submission blocked by native validation: {}", message);
                }
                state.submission = Some(submission);
                Ok(StepFlow::Next)
            }
            Step::Observe(expectation) => self.observe(session, expectation, state).await,
            Step::Click { target, presence } => match session.locate_first(target).await? {
                Lookup::Found(el) => {
                    session.interact(&el, &Interaction::Click).await?;
                    Ok(StepFlow::Next)
                }
                Lookup::NotFound => missing(target, presence),
            },
            Step::ExpectElement { target, timeout } => {
                let settings = self.page_settings(*timeout);
                if wait_for_element(session, target, settings).await? {
                    Ok(StepFlow::Next)
                } else {
                    Err(HarnessError::Timeout {
                        what: target.to_string(),
                        after_ms: settings.timeout.as_millis() as u64,
                    })
                }
            }
            Step::Capture { target, presence } => match session.locate_first(target).await? {
                Lookup::Found(el) => {
                    let text = session.element_text(&el).await?.trim().to_string();
                    if text.is_empty() {
                        return Ok(StepFlow::Fail(format!("{} has no text", target)));
                    }
                    log::debug!("Captured '{}' from {}", text, target);
                    state.captured = Some(text);
                    Ok(StepFlow::Next)
                }
                Lookup::NotFound => missing(target, presence),
            },
            Step::ExpectCaptured { target, timeout } => {
                let Some(ref expected) = state.captured else {
                    return Ok(StepFlow::Fail(format!(
                        "nothing captured to compare with {}",
                        target
                    )));
                };
                let settings = self.page_settings(*timeout);
                match wait_for_matching_text(session, target, expected, settings).await? {
                    Some(seen) => {
                        state.evidence = Some(format!("{} shows '{}'", target, seen));
                        Ok(StepFlow::Next)
                    }
                    None => Ok(StepFlow::Fail(format!(
                        "{} never showed '{}' within {}ms",
                        target,
                        expected,
                        settings.timeout.as_millis()
                    ))),
                }
            }
            Step::ClearCookies => {
                session.clear_cookies().await?;
                Ok(StepFlow::Next)
            }
            Step::Pause(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(StepFlow::Next)
            }
        }
    }

    async fn await_ready(
        &self,
        session: &dyn BrowserSession,
        readiness: &Readiness,
    ) -> HarnessResult<StepFlow> {
        let settings = self.page_settings(readiness.timeout);
        match wait_for_state(session, &readiness.recognizers, settings).await? {
            PageState::FormReady => Ok(StepFlow::Next),
            PageState::Unknown => {
                let body = session.body_text().await.unwrap_or_default();
                Ok(StepFlow::Fail(format!(
                    "page state \"unknown\" not ready for form; page text: {}",
                    snippet(&body, 400)
                )))
            }
            other => Err(HarnessError::UnexpectedPageState(other)),
        }
    }

    /// Fill every field of `form` in order
    pub async fn fill_form(&self, session: &dyn BrowserSession, form: &FormSpec) -> HarnessResult<()> {
        for (selector, value) in form.fields() {
            let el = session.locate_first(selector).await?.required(selector)?;
            match value {
                FieldValue::Text(text) => {
                    session.interact(&el, &Interaction::ClearValue).await?;
                    session
                        .interact(&el, &Interaction::TypeText(text.clone()))
                        .await?;
                }
                FieldValue::DateTime(raw) => {
                    let value = normalize_future_datetime(
                        raw,
                        Local::now().naive_local(),
                        self.config.event_minutes_ahead,
                    );
                    log::info!("Setting {} to {}", selector, value);
                    session
                        .interact(
                            &el,
                            &Interaction::SetAttributeRaw(RawAttribute::ForceValue(value)),
                        )
                        .await?;
                }
                FieldValue::Empty => {
                    session.interact(&el, &Interaction::ClearValue).await?;
                    if !form.preserve_required() {
                        session
                            .interact(
                                &el,
                                &Interaction::SetAttributeRaw(RawAttribute::Remove(
                                    "required".to_string(),
                                )),
                            )
                            .await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Click `control`, then read native validation state right away: a
    /// blocked submission produces no navigation or toast to wait for.
    pub async fn submit(
        &self,
        session: &dyn BrowserSession,
        control: &Selector,
    ) -> HarnessResult<Submission> {
        let el = session.locate_first(control).await?.required(control)?;
        session.interact(&el, &Interaction::Click).await?;
        tokio::time::sleep(self.config.timeouts.submit_settle).await;

        let messages = session.validation_messages().await?;
        Ok(match messages.into_iter().find(|m| !m.trim().is_empty()) {
            Some(message) => Submission::Blocked { message },
            None => Submission::Submitted,
        })
    }

    async fn observe(
        &self,
        session: &dyn BrowserSession,
        expectation: &Expectation,
        state: &mut RunState,
    ) -> HarnessResult<StepFlow> {
        if let Some(Submission::Blocked { ref message }) = state.submission {
            if contains_any_ignore_case(message, &expectation.accept).is_some() {
                state.evidence = Some(format!("native validation message: '{}'", message));
                return Ok(StepFlow::Next);
            }
            return Ok(StepFlow::Fail(format!(
                "native validation blocked submission with '{}'; expected one of {:?}",
                message, expectation.accept
            )));
        }

        let settings = match expectation.timeout {
            Some(timeout) => self.config.timeouts.toast().with_timeout(timeout),
            None => self.config.timeouts.toast(),
        };

        if let Some(evidence) = wait_for_evidence(session, expectation, settings).await? {
            log::info!("Observed: {}", evidence);
            state.evidence = Some(evidence);
            return Ok(StepFlow::Next);
        }

        let reject_settings = settings.with_timeout(settings.timeout.min(Duration::from_secs(3)));
        if let Some(hit) = wait_for_any_text(session, &expectation.reject, reject_settings).await? {
            return Ok(StepFlow::Fail(format!("saw failure text: '{}'", hit)));
        }

        let mut detail = format!(
            "no native block; missing expected text from {:?}",
            expectation.accept
        );
        match expectation.url {
            Some(Probe::UrlContains(ref fragment)) => {
                detail.push_str(&format!(" and URL never contained '{}'", fragment))
            }
            Some(Probe::UrlEquals(ref target)) => {
                detail.push_str(&format!(" and never landed on '{}'", target))
            }
            _ => {}
        }
        Ok(StepFlow::Fail(detail))
    }

    fn page_settings(&self, timeout: Option<Duration>) -> PollSettings {
        let settings = self.config.timeouts.page();
        match timeout {
            Some(t) => settings.with_timeout(t),
            None => settings,
        }
    }
}

/// Poll for accepted text, or the expected URL when one is given
async fn wait_for_evidence(
    session: &dyn BrowserSession,
    expectation: &Expectation,
    settings: PollSettings,
) -> HarnessResult<Option<String>> {
    let Some(ref probe) = expectation.url else {
        let found = wait_for_any_text(session, &expectation.accept, settings).await?;
        return Ok(found.map(|text| format!("saw expected text: '{}'", text)));
    };

    let accept = &expectation.accept;
    poll(settings, || async move {
        for text in accept {
            if session.is_present(&Selector::text(text.as_str())).await? {
                return Ok(Some(format!("saw expected text: '{}'", text)));
            }
        }
        let url = session.current_url().await?;
        if probe.holds(session, &url).await? {
            return Ok(Some(format!("redirected to {}", url)));
        }
        Ok(None)
    })
    .await
}

/// Absent target handling shared by clicks and captures
fn missing(target: &Selector, presence: &Presence) -> HarnessResult<StepFlow> {
    match presence {
        Presence::Required => Err(HarnessError::ElementNotFound(target.to_string())),
        Presence::Optional { skip_reason } => Ok(StepFlow::Skip(skip_reason.clone())),
        Presence::IfPresent => {
            log::debug!("{} not present, continuing", target);
            Ok(StepFlow::Next)
        }
    }
}

/// Poll `target` until one match's text contains `expected` or is contained
/// in it, ignoring case
async fn wait_for_matching_text(
    session: &dyn BrowserSession,
    target: &Selector,
    expected: &str,
    settings: PollSettings,
) -> HarnessResult<Option<String>> {
    let expected = expected.to_lowercase();
    let expected = expected.as_str();
    poll(settings, || async move {
        for el in session.locate(target).await? {
            // a re-render between lookup and read drops the match for this tick
            let text = match session.element_text(&el).await {
                Ok(text) => text.trim().to_string(),
                Err(HarnessError::ElementNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();
            if lower.contains(expected) || expected.contains(lower.as_str()) {
                return Ok(Some(text));
            }
        }
        Ok(None)
    })
    .await
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{FakePage, NATIVE_REQUIRED_MESSAGE};
    use crate::runner::state::VerdictStatus;

    const BASE: &str = "http://localhost:5173";

    fn submit_button() -> Selector {
        Selector::xpath("//button[@type='submit']")
    }

    fn signup_page() -> FakePage {
        let page = FakePage::new(BASE);
        let fields: Vec<(Selector, bool)> = ["email", "confirmEmail", "fullName", "password", "confirmPassword"]
            .iter()
            .map(|id| (Selector::id(*id), true))
            .collect();
        page.form(submit_button(), &fields, |state| {
            if state.value(&Selector::id("email")).is_empty() {
                state.show_text_after("Email is required.", Duration::from_millis(400));
            } else {
                state.show_text_after("Account created!", Duration::from_millis(400));
            }
        });
        page
    }

    fn signup_case(email: &str, preserve_required: bool, expected: &str) -> Scenario {
        Scenario::new("empty email").steps([
            Step::Navigate("/SignUp".into()),
            Step::AwaitState(Readiness::new(vec![Recognizer::settle(
                PageState::FormReady,
                Probe::ElementPresent(Selector::id("email")),
            )])),
            Step::FillForm(
                FormSpec::new(preserve_required)
                    .text("email", email)
                    .text("confirmEmail", "user@example.edu")
                    .text("fullName", "Test User")
                    .text("password", "SecurePass123!")
                    .text("confirmPassword", "SecurePass123!"),
            ),
            Step::Submit(submit_button()),
            Step::Observe(Expectation::text(expected)),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_email_reaches_custom_validation() {
        let config = HarnessConfig::default();
        let page = signup_page();

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &signup_case("", false, "Email is required."))
            .await;

        assert_eq!(verdict.name, "empty email");
        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert!(verdict.detail.contains("Email is required."));
        // required was stripped so the app's own validation ran
        assert!(!page.state().required.contains(&Selector::id("email")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_toast_fails_with_explanation() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        let fields: Vec<(Selector, bool)> = ["email", "confirmEmail", "fullName", "password", "confirmPassword"]
            .iter()
            .map(|id| (Selector::id(*id), false))
            .collect();
        page.form(submit_button(), &fields, |_| {});

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &signup_case("", false, "Email is required."))
            .await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(verdict.detail.contains("missing expected text"));
        assert!(verdict.detail.contains("Email is required."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_preserved_required_is_blocked_natively() {
        let config = HarnessConfig::default();
        let page = signup_page();

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &signup_case("", true, "Please fill out this field"))
            .await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert!(verdict.detail.contains(NATIVE_REQUIRED_MESSAGE));
        // no toast was ever shown, the verdict came from the native message
        assert!(page.state().required.contains(&Selector::id("email")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_event_with_future_date_submits() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        let fields = vec![
            (Selector::id("title"), true),
            (Selector::id("date"), true),
            (Selector::id("location"), true),
        ];
        page.form(submit_button(), &fields, |state| {
            state.show_text_after("Event submitted for approval", Duration::from_millis(800));
        });

        let scenario = Scenario::new("create event").steps([
            Step::FillForm(
                FormSpec::new(true)
                    .text("title", "Test Event")
                    .datetime("date", "2001-01-01T10:00")
                    .text("location", "Hall building"),
            ),
            Step::Submit(submit_button()),
            Step::Observe(Expectation::texts(&["submitted for approval", "Event Created"])),
        ]);

        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert!(verdict.detail.contains("submitted for approval"));

        let date = page.state().value(&Selector::id("date")).to_string();
        let parsed =
            chrono::NaiveDateTime::parse_from_str(&date, crate::driver::common::DATETIME_LOCAL_FORMAT)
                .unwrap();
        assert!(parsed > Local::now().naive_local());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_submission_fails_success_expectation() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.form(submit_button(), &[(Selector::id("title"), true)], |_| {});

        let scenario = Scenario::new("create event").steps([
            Step::FillForm(FormSpec::new(true).text("title", "")),
            Step::Submit(submit_button()),
            Step::Observe(Expectation::text("submitted for approval")),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(verdict.detail.contains("native validation blocked submission"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_page_state_is_named() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.on_navigate("/create-event", |state| state.show_text("Access Restricted"));

        let scenario = Scenario::new("empty title").steps([
            Step::Navigate("/create-event".into()),
            Step::AwaitState(Readiness::new(vec![
                Recognizer::settle(PageState::FormReady, Probe::ElementPresent(Selector::id("title"))),
                Recognizer::settle(PageState::AccessDenied, Probe::TextPresent("Access Restricted".into())),
            ])),
            Step::FillForm(FormSpec::new(true).text("title", "")),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(verdict.detail.contains("access-denied"), "{}", verdict.detail);
        assert!(page.state().interactions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_page_reports_bounded_text() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.on_navigate("/SignUp", |state| {
            state.show_text(&"Something went wrong.   ".repeat(40))
        });

        let scenario = Scenario::new("empty email").steps([
            Step::Navigate("/SignUp".into()),
            Step::AwaitState(Readiness::new(vec![Recognizer::settle(
                PageState::FormReady,
                Probe::ElementPresent(Selector::id("email")),
            )])),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        let (head, text) = verdict
            .detail
            .split_once("page text: ")
            .expect("page text in detail");
        assert_eq!(head, "page state \"unknown\" not ready for form; ");
        assert!(text.starts_with("Something went wrong. Something"));
        assert_eq!(text.chars().count(), 400);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expected_element_timeout_names_selector() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);

        let scenario = Scenario::new("event details page").step(Step::ExpectElement {
            target: Selector::css("h1"),
            timeout: Some(Duration::from_secs(2)),
        });
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(
            verdict.detail,
            "step 1 (expect element): timed out after 2000ms waiting for css `h1`"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_captured_text_matches_later_heading() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        let card = Selector::css(".event-card h3");
        {
            let mut state = page.state();
            state.set_element(card.clone(), 2);
            state
                .element_texts
                .insert(card.clone(), "Hackathon 2026".to_string());
        }
        page.on_click(card.clone(), |state| {
            state.set_element(Selector::css("h1"), 1);
            state
                .element_texts
                .insert(Selector::css("h1"), "HACKATHON 2026 - Main Hall".to_string());
        });

        let scenario = Scenario::new("details").steps([
            Step::Capture {
                target: card.clone(),
                presence: Presence::Required,
            },
            Step::Click {
                target: card,
                presence: Presence::Required,
            },
            Step::ExpectCaptured {
                target: Selector::css("h1"),
                timeout: None,
            },
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert_eq!(verdict.detail, "css `h1` shows 'HACKATHON 2026 - Main Hall'");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_captured_without_capture_fails() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);

        let scenario = Scenario::new("details").step(Step::ExpectCaptured {
            target: Selector::css("h1"),
            timeout: None,
        });
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(verdict.detail, "nothing captured to compare with css `h1`");
    }

    #[tokio::test(start_paused = true)]
    async fn test_optional_click_skips_when_absent() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);

        let scenario = Scenario::new("Approve event").steps([
            Step::Navigate("/approve-events".into()),
            Step::Click {
                target: Selector::text("Approve"),
                presence: Presence::optional("no pending events to approve"),
            },
            Step::Observe(Expectation::text("approved")),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Skipped);
        assert_eq!(verdict.detail, "no pending events to approve");
    }

    #[tokio::test(start_paused = true)]
    async fn test_required_element_missing_fails() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);

        let scenario = Scenario::new("login").step(Step::FillForm(
            FormSpec::new(true).text("email", "admin"),
        ));
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(verdict.detail, "step 1 (fill form): element not found: #email");
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_counts_as_evidence() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.form(submit_button(), &[(Selector::id("email"), true)], |state| {
            state.url = "http://localhost:5173/my-events".to_string();
        });

        let scenario = Scenario::new("login").steps([
            Step::FillForm(FormSpec::new(true).text("email", "company@example.com")),
            Step::Submit(submit_button()),
            Step::Observe(Expectation::text("Welcome!").or_url("my-events")),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert_eq!(verdict.detail, "redirected to http://localhost:5173/my-events");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reject_text_explains_failure() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.form(submit_button(), &[], |state| state.show_text("Login Failed"));

        let scenario = Scenario::new("login").steps([
            Step::Submit(submit_button()),
            Step::Observe(Expectation::text("Welcome!").rejecting(&["Login Failed", "Invalid"])),
        ]);
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert_eq!(verdict.detail, "saw failure text: 'Login Failed'");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_becomes_failed_verdict() {
        let config = HarnessConfig::default();
        let page = FakePage::new(BASE);
        page.state().panicking_paths.insert("/search".into());

        let scenario = Scenario::new("Event details page").step(Step::Navigate("/search".into()));
        let verdict = ScenarioRunner::new(&config).run(&page, &scenario).await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(verdict.detail.starts_with("internal fault: scripted fault"));
    }
}
