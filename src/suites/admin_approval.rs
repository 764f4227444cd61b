//! Admin review of pending events

use std::time::Duration;

use super::login_scenario;
use crate::driver::common::xpath_literal;
use crate::driver::traits::Selector;
use crate::runner::scenario::{Expectation, Presence, Scenario, Step};
use crate::utils::config::{HarnessConfig, Role};

const APPROVE_EVENTS_PATH: &str = "/admin/approve-events";

/// Event cards carrying a Pending badge
const PENDING_CARD: &str = "//*[(contains(@class, 'Card') or contains(@class, 'event-card') \
     or @data-testid='event-card') and .//span[contains(., 'Pending') or contains(., 'pending')]]";

fn pending(descendant: &str) -> Selector {
    Selector::xpath(format!("{}{}", PENDING_CARD, descendant))
}

fn pending_title() -> Selector {
    pending("//*[self::h3 or contains(@class, 'title')]")
}

fn pending_button(label: &str) -> Selector {
    let label = xpath_literal(label);
    pending(&format!(
        "//button[contains(., {0}) or @aria-label={0}]",
        label
    ))
}

fn open_approvals() -> Vec<Step> {
    vec![
        Step::Open {
            link: Selector::xpath("//a[contains(@href, '/admin/approve-events')]"),
            fallback: APPROVE_EVENTS_PATH.to_string(),
        },
        // cards are fetched after the route renders
        Step::Pause(Duration::from_secs(2)),
    ]
}

fn decide(name: &str, button: &str, confirmations: &[&str]) -> Scenario {
    Scenario::new(name).steps(open_approvals()).steps([
        Step::Click {
            target: pending_button(button),
            presence: Presence::optional("no pending events"),
        },
        Step::Observe(Expectation::texts(confirmations).within(Duration::from_secs(5))),
    ])
}

pub fn scenarios(config: &HarnessConfig) -> Vec<Scenario> {
    vec![
        login_scenario(config, Role::Admin),
        Scenario::new("view event details")
            .steps(open_approvals())
            .steps([
                Step::Capture {
                    target: pending_title(),
                    presence: Presence::optional("no pending events"),
                },
                Step::Click {
                    target: pending_title(),
                    presence: Presence::Required,
                },
                // the details page heading names the clicked event
                Step::ExpectCaptured {
                    target: Selector::css("h1"),
                    timeout: Some(Duration::from_secs(5)),
                },
            ]),
        decide("approve event", "Approve", &["approved", "Approved", "Success"]),
        decide("reject event", "Reject", &["rejected", "Rejected", "Success"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::FakePage;
    use crate::runner::scenario::ScenarioRunner;
    use crate::runner::state::VerdictStatus;

    #[tokio::test(start_paused = true)]
    async fn test_no_pending_events_skips() {
        let config = HarnessConfig::default();
        let page = FakePage::new("http://localhost:5173");
        let runner = ScenarioRunner::new(&config);

        for scenario in &scenarios(&config)[1..] {
            let verdict = runner.run(&page, scenario).await;
            assert_eq!(verdict.status, VerdictStatus::Skipped, "{}", scenario.name);
            assert_eq!(verdict.detail, "no pending events");
        }
        assert_eq!(page.state().navigations.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_approve_pending_event() {
        let config = HarnessConfig::default();
        let page = FakePage::new("http://localhost:5173");
        let approve = pending_button("Approve");
        assert!(approve
            .to_driver_selector()
            .ends_with("//button[contains(., 'Approve') or @aria-label='Approve']"));
        page.state().set_element(approve.clone(), 2);
        page.on_click(approve, |state| {
            state.show_text_after("Event approved", Duration::from_millis(600))
        });

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &scenarios(&config)[2])
            .await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert_eq!(verdict.detail, "saw expected text: 'approved'");
    }

    fn listing_with_pending(title: &str) -> FakePage {
        let page = FakePage::new("http://localhost:5173");
        let mut state = page.state();
        state.set_element(pending_title(), 1);
        state.element_texts.insert(pending_title(), format!("  {}\n", title));
        // approvals page has its own heading
        state.set_element(Selector::css("h1"), 1);
        state
            .element_texts
            .insert(Selector::css("h1"), "Approve Events".to_string());
        drop(state);
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_details_click_that_stays_on_listing_fails() {
        let config = HarnessConfig::default();
        let page = listing_with_pending("Spring Career Fair");

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &scenarios(&config)[1])
            .await;

        assert_eq!(verdict.status, VerdictStatus::Failed);
        assert!(
            verdict.detail.contains("never showed 'Spring Career Fair'"),
            "{}",
            verdict.detail
        );
        assert_eq!(page.state().interactions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_details_heading_names_clicked_event() {
        let config = HarnessConfig::default();
        let page = listing_with_pending("Spring Career Fair");
        page.on_click(pending_title(), |state| {
            state.url = "http://localhost:5173/events/42".to_string();
            state
                .element_texts
                .insert(Selector::css("h1"), "Spring Career Fair".to_string());
        });

        let verdict = ScenarioRunner::new(&config)
            .run(&page, &scenarios(&config)[1])
            .await;

        assert!(verdict.is_passed(), "{}", verdict.detail);
        assert_eq!(verdict.detail, "css `h1` shows 'Spring Career Fair'");
    }

    #[test]
    fn test_button_label_with_apostrophe() {
        let sel = pending_button("Don't approve");
        assert!(sel
            .to_driver_selector()
            .ends_with(r#"//button[contains(., "Don't approve") or @aria-label="Don't approve"]"#));
    }
}
