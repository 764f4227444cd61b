//! Scenario catalog of the campus-events app
//!
//! Each suite is a fixed, ordered list of scenarios built from the
//! configuration. Suites run in [`SuiteKind::ALL`] order under `all`.

pub mod admin_approval;
pub mod create_event;
pub mod signup;
pub mod student_ops;

use std::fmt;
use std::str::FromStr;

use crate::driver::traits::Selector;
use crate::runner::scenario::{Expectation, FieldValue, FormSpec, Scenario, Step};
use crate::utils::config::{HarnessConfig, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteKind {
    StudentSignup,
    CompanyCreateEvent,
    AdminApproveEvents,
    DatabaseOperations,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 4] = [
        SuiteKind::StudentSignup,
        SuiteKind::CompanyCreateEvent,
        SuiteKind::AdminApproveEvents,
        SuiteKind::DatabaseOperations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SuiteKind::StudentSignup => "student-signup",
            SuiteKind::CompanyCreateEvent => "company-create-event",
            SuiteKind::AdminApproveEvents => "admin-approve-events",
            SuiteKind::DatabaseOperations => "database-operations",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SuiteKind::StudentSignup => "Student sign-up form validation",
            SuiteKind::CompanyCreateEvent => "Organizer event creation form validation",
            SuiteKind::AdminApproveEvents => "Admin review of pending events",
            SuiteKind::DatabaseOperations => "Student RSVP, tickets and navigation flows",
        }
    }

    pub fn scenarios(&self, config: &HarnessConfig) -> Vec<Scenario> {
        match self {
            SuiteKind::StudentSignup => signup::scenarios(config),
            SuiteKind::CompanyCreateEvent => create_event::scenarios(config),
            SuiteKind::AdminApproveEvents => admin_approval::scenarios(config),
            SuiteKind::DatabaseOperations => student_ops::scenarios(config),
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SuiteKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SuiteKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown suite '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

pub(crate) fn submit_button() -> Selector {
    Selector::xpath("//button[@type='submit']")
}

/// Any element whose class mentions a card: the app's event and ticket tiles
pub(crate) fn event_card() -> Selector {
    Selector::css("[class*='Card'], .event-card, [data-testid='event-card']")
}

/// Steps logging in through the landing page form
pub(crate) fn login_steps(config: &HarnessConfig, role: Role) -> Vec<Step> {
    let credential = config.credentials.for_role(role);
    let email = Selector::css("input[type='email']");
    let password = Selector::css("input[type='password']");

    let mut expectation = Expectation::text("Welcome!")
        .rejecting(&["Login Failed", "Invalid", "Error"])
        .within(config.timeouts.page_wait);
    if role == Role::Company {
        expectation = expectation.or_url("my-events");
    }

    vec![
        Step::Navigate("/".to_string()),
        Step::ExpectElement {
            target: email.clone(),
            timeout: None,
        },
        Step::FillForm(
            FormSpec::new(true)
                .field(email, FieldValue::Text(credential.email.clone()))
                .field(password, FieldValue::Text(credential.password.clone())),
        ),
        Step::Submit(submit_button()),
        Step::Observe(expectation),
    ]
}

pub(crate) fn login_scenario(config: &HarnessConfig, role: Role) -> Scenario {
    let who = match role {
        Role::Admin => "admin",
        Role::Company => "company",
        Role::Student => "student",
    };
    Scenario::new(&format!("login as {}", who)).steps(login_steps(config, role))
}
