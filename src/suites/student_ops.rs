//! Student flows that read and write event data: details, tickets, RSVP,
//! stars, filters and navigation. Ends with an organizer check after
//! switching accounts.

use std::time::Duration;

use super::{event_card, login_steps};
use crate::driver::common::xpath_literal;
use crate::driver::traits::Selector;
use crate::runner::scenario::{Expectation, FieldValue, FormSpec, Presence, Scenario, Step};
use crate::utils::config::{HarnessConfig, Role};

fn page(path: &str) -> [Step; 2] {
    [
        Step::Navigate(path.to_string()),
        Step::Pause(Duration::from_secs(2)),
    ]
}

fn button_with(labels: &[&str]) -> Selector {
    let predicate = labels
        .iter()
        .map(|label| format!("contains(., {})", xpath_literal(label)))
        .collect::<Vec<_>>()
        .join(" or ");
    Selector::xpath(format!("//button[{}]", predicate))
}

fn open_first_event() -> Step {
    Step::Click {
        target: event_card(),
        presence: Presence::optional("no events listed"),
    }
}

fn event_details() -> Scenario {
    Scenario::new("event details page")
        .steps(page("/search"))
        .steps([
            open_first_event(),
            Step::ExpectElement {
                target: Selector::css("h1"),
                timeout: None,
            },
        ])
}

fn view_tickets() -> Scenario {
    Scenario::new("view tickets")
        .steps(page("/my-tickets"))
        .step(Step::ExpectElement {
            // either a ticket or the empty-state message
            target: Selector::xpath(
                "//*[contains(@class, 'Card') or contains(@class, 'ticket-card')] \
                 | //*[contains(text(), 'No tickets') or contains(text(), 'no events')]",
            ),
            timeout: None,
        })
}

fn rsvp() -> Scenario {
    Scenario::new("RSVP to event")
        .steps(page("/search"))
        .steps([
            open_first_event(),
            Step::Pause(Duration::from_secs(2)),
            Step::Click {
                target: button_with(&["RSVP", "Register"]),
                presence: Presence::optional("no RSVP button (already registered)"),
            },
            Step::Observe(
                Expectation::texts(&["Success", "registered", "RSVP"])
                    .within(Duration::from_secs(5)),
            ),
        ])
}

fn cancel_rsvp() -> Scenario {
    Scenario::new("cancel RSVP")
        .steps(page("/my-tickets"))
        .steps([
            Step::Click {
                target: button_with(&["Cancel", "Unregister"]),
                presence: Presence::optional("no RSVP to cancel"),
            },
            Step::Pause(Duration::from_secs(1)),
            Step::Click {
                target: button_with(&["Confirm", "Yes"]),
                presence: Presence::IfPresent,
            },
        ])
}

fn starred() -> Scenario {
    Scenario::new("starred events")
        .steps(page("/search"))
        .steps([
            Step::Click {
                target: Selector::xpath(
                    "//button[contains(@aria-label, 'star') or .//svg[contains(@class, 'star')]]",
                ),
                presence: Presence::optional("no star buttons"),
            },
            Step::Pause(Duration::from_secs(1)),
            Step::Navigate("/starred".to_string()),
            Step::ExpectElement {
                target: Selector::css("body"),
                timeout: None,
            },
        ])
}

fn filters() -> Scenario {
    Scenario::new("event filters")
        .steps(page("/search"))
        .steps([
            Step::Click {
                target: button_with(&["Filter", "Category"]),
                presence: Presence::optional("no filter control"),
            },
            Step::Pause(Duration::from_secs(1)),
            Step::Click {
                target: Selector::xpath(
                    "//button[contains(@role, 'option')] | //*[contains(@class, 'category')]",
                ),
                presence: Presence::IfPresent,
            },
        ])
}

fn navigation() -> Scenario {
    let mut scenario = Scenario::new("navigation links");
    for path in ["/", "/search", "/my-events", "/my-tickets"] {
        scenario = scenario.steps([
            Step::Navigate(path.to_string()),
            Step::ExpectElement {
                target: Selector::css("body"),
                timeout: None,
            },
        ]);
    }
    scenario
}

/// Organizer can reach the create-event form after an account switch
fn company_create_event(config: &HarnessConfig) -> Scenario {
    let title = Selector::css("input[name='title'], input[placeholder*='title' i]");
    Scenario::new("company create event")
        .step(Step::ClearCookies)
        .steps(login_steps(config, Role::Company))
        .steps(page("/create-event"))
        .steps([
            Step::ExpectElement {
                target: title.clone(),
                timeout: Some(config.timeouts.page_wait),
            },
            Step::FillForm(
                FormSpec::new(true)
                    .field(title, FieldValue::Text("Test Event - Automated".to_string())),
            ),
        ])
}

pub fn scenarios(config: &HarnessConfig) -> Vec<Scenario> {
    vec![
        super::login_scenario(config, Role::Student),
        event_details(),
        view_tickets(),
        rsvp(),
        cancel_rsvp(),
        starred(),
        filters(),
        navigation(),
        company_create_event(config),
    ]
}
