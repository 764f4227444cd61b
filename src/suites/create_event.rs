//! Organizer event creation
//!
//! The validation cases keep `required` in place: the browser itself
//! blocks them and the native message is what gets asserted.

use std::time::Duration;

use chrono::Local;

use super::login_scenario;
use crate::driver::common::{format_datetime_local, future_datetime, xpath_literal};
use crate::driver::traits::Selector;
use crate::runner::poller::{PageState, Probe, Recognizer};
use crate::runner::scenario::{
    Expectation, FieldValue, FormSpec, Presence, Readiness, Scenario, Step,
};
use crate::utils::config::{HarnessConfig, Role};

const CREATE_EVENT_PATH: &str = "/create-event";
const CATEGORY: &str = "Technology";
const NATIVE_REQUIRED: &str = "Please fill out this field";
const ONE_WEEK_MINUTES: i64 = 7 * 24 * 60;
/// Time for the app to persist the organizer session after login
const SESSION_SAVE: Duration = Duration::from_secs(3);

struct EventForm {
    title: String,
    description: String,
    date: String,
    location: String,
    capacity: String,
    image: String,
    tags: Vec<String>,
}

impl EventForm {
    fn valid(date: &str) -> Self {
        Self {
            title: "Test Event".to_string(),
            description: "Test description".to_string(),
            date: date.to_string(),
            location: "Test Location".to_string(),
            capacity: "50".to_string(),
            image: String::new(),
            tags: Vec::new(),
        }
    }

    fn to_spec(&self) -> FormSpec {
        FormSpec::new(true)
            .text("title", &self.title)
            .text("description", &self.description)
            .datetime("date", &self.date)
            .text("location", &self.location)
            .text("capacity", &self.capacity)
            .text("image", &self.image)
    }
}

fn readiness(config: &HarnessConfig) -> Readiness {
    Readiness {
        recognizers: vec![
            Recognizer::settle(PageState::RedirectedToLogin, Probe::UrlContains("login".into())),
            Recognizer::settle(PageState::FormReady, Probe::ElementPresent(Selector::id("title"))),
            Recognizer::settle(
                PageState::AccessDenied,
                Probe::TextPresent("Access Restricted".into()),
            ),
            Recognizer::tentative(
                PageState::ApprovalPending,
                Probe::TextPresent("Checking organization approval".into()),
            ),
        ],
        timeout: Some(config.timeouts.page_wait),
    }
}

fn submit_control() -> Selector {
    Selector::xpath("//button[@type='submit' and not(contains(., 'Cancel'))]")
}

fn category_steps() -> Vec<Step> {
    vec![
        Step::Click {
            target: Selector::xpath("//button[contains(@class, 'select') or @role='combobox']"),
            presence: Presence::IfPresent,
        },
        Step::Pause(Duration::from_millis(500)),
        Step::Click {
            target: Selector::xpath(format!(
                "//*[@role='option' and contains(., {})]",
                xpath_literal(CATEGORY)
            )),
            presence: Presence::IfPresent,
        },
    ]
}

fn tag_steps(tags: &[String]) -> Vec<Step> {
    let input = Selector::xpath("//input[@placeholder='Add a tag']");
    tags.iter()
        .flat_map(|tag| {
            [
                Step::FillForm(
                    FormSpec::new(true).field(input.clone(), FieldValue::Text(tag.clone())),
                ),
                Step::Click {
                    target: Selector::xpath("//button[contains(., 'Add')]"),
                    presence: Presence::IfPresent,
                },
                Step::Pause(Duration::from_millis(300)),
            ]
        })
        .collect()
}

fn create_event(
    config: &HarnessConfig,
    name: &str,
    form: EventForm,
    expectation: Expectation,
) -> Scenario {
    Scenario::new(name)
        .steps([
            Step::Open {
                link: Selector::xpath("//a[normalize-space(.)='Create Event']"),
                fallback: CREATE_EVENT_PATH.to_string(),
            },
            Step::AwaitState(readiness(config)),
            Step::FillForm(form.to_spec()),
        ])
        .steps(category_steps())
        .steps(tag_steps(&form.tags))
        .steps([Step::Submit(submit_control()), Step::Observe(expectation)])
}

pub fn scenarios(config: &HarnessConfig) -> Vec<Scenario> {
    let future_date = format_datetime_local(&future_datetime(ONE_WEEK_MINUTES));
    let valid = || EventForm::valid(&future_date);

    let mut scenarios = vec![
        login_scenario(config, Role::Company).step(Step::Pause(SESSION_SAVE)),
        create_event(
            config,
            "empty title",
            EventForm {
                title: String::new(),
                ..valid()
            },
            Expectation::text(NATIVE_REQUIRED),
        ),
        create_event(
            config,
            "empty description",
            EventForm {
                description: String::new(),
                ..valid()
            },
            Expectation::text(NATIVE_REQUIRED),
        ),
        create_event(
            config,
            "empty date",
            EventForm {
                date: String::new(),
                ..valid()
            },
            Expectation::text(NATIVE_REQUIRED),
        ),
        create_event(
            config,
            "empty location",
            EventForm {
                location: String::new(),
                ..valid()
            },
            Expectation::text(NATIVE_REQUIRED),
        ),
        create_event(
            config,
            "invalid capacity (0)",
            EventForm {
                capacity: "0".to_string(),
                ..valid()
            },
            Expectation::texts(&[
                "greater than or equal to 1",
                NATIVE_REQUIRED,
                "Please enter a number",
            ]),
        ),
    ];

    if config.run_success {
        let stamp = Local::now().timestamp();
        scenarios.push(create_event(
            config,
            "valid event (future date)",
            EventForm {
                title: format!("Test Event {}", stamp),
                description: "This is a test event created by automated testing".to_string(),
                location: "Hall building".to_string(),
                capacity: "100".to_string(),
                image: "https://example.com/event.jpg".to_string(),
                tags: vec!["test".to_string(), "automation".to_string()],
                ..valid()
            },
            Expectation::texts(&[
                "submitted for approval",
                "Event Created",
                "submitted for admin approval",
                "Success",
            ])
            .or_url("my-events")
            .rejecting(&["Error", "Failed", "failed"]),
        ));
    }

    scenarios
}
