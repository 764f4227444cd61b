use std::path::PathBuf;
use std::time::Duration;

use crate::driver::SessionConfig;
use crate::runner::poller::PollSettings;

/// Login role in the application under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Company,
    Student,
}

/// Email/password pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

impl Credential {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub admin: Credential,
    pub company: Credential,
    pub student: Credential,
}

impl Credentials {
    pub fn for_role(&self, role: Role) -> &Credential {
        match role {
            Role::Admin => &self.admin,
            Role::Company => &self.company,
            Role::Student => &self.student,
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            admin: Credential::new("admin", "admin1"),
            company: Credential::new("testingsprint3@gmail.com", "testingsprint3"),
            student: Credential::new("student@gmail.com", "student1"),
        }
    }
}

/// Wait budgets
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Page readiness after navigation
    pub page_wait: Duration,
    /// Toast/status text after an action
    pub toast_wait: Duration,
    /// Sampling interval of every poll
    pub poll_interval: Duration,
    /// Pause between clicking submit and reading native validation state
    pub submit_settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_wait: Duration::from_secs(15),
            toast_wait: Duration::from_secs(6),
            poll_interval: Duration::from_millis(250),
            submit_settle: Duration::from_millis(300),
        }
    }
}

impl Timeouts {
    pub fn page(&self) -> PollSettings {
        PollSettings::new(self.page_wait, self.poll_interval)
    }

    pub fn toast(&self) -> PollSettings {
        PollSettings::new(self.toast_wait, self.poll_interval)
    }
}

/// Harness configuration, built once at startup and passed down by reference
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub session: SessionConfig,
    pub credentials: Credentials,
    /// Also run the opt-in happy-path scenarios that create real data
    pub run_success: bool,
    /// Treat ambiguous success signals as failures
    pub strict: bool,
    /// How far ahead generated event dates are placed
    pub event_minutes_ahead: i64,
    pub timeouts: Timeouts,
    /// Where suite reports are written, if anywhere
    pub output_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            session: SessionConfig::default(),
            credentials: Credentials::default(),
            run_success: false,
            strict: false,
            event_minutes_ahead: 180,
            timeouts: Timeouts::default(),
            output_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Absolute URL for an application path
    pub fn url(&self, path: &str) -> String {
        crate::driver::common::resolve_url(&self.base_url, path)
    }

    /// Environment that reproduces this configuration in a child process
    pub fn to_env(&self) -> Vec<(&'static str, String)> {
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        let mut env = vec![
            ("APP_BASE_URL", self.base_url.clone()),
            ("HEADLESS", flag(self.session.headless)),
            ("QUIET", flag(self.session.suppress_logs)),
            ("RUN_SUCCESS", flag(self.run_success)),
            ("STRICT", flag(self.strict)),
            ("EVENT_MINUTES_AHEAD", self.event_minutes_ahead.to_string()),
            ("ADMIN_EMAIL", self.credentials.admin.email.clone()),
            ("ADMIN_PASSWORD", self.credentials.admin.password.clone()),
            ("COMPANY_EMAIL", self.credentials.company.email.clone()),
            ("COMPANY_PASSWORD", self.credentials.company.password.clone()),
            ("STUDENT_EMAIL", self.credentials.student.email.clone()),
            ("STUDENT_PASSWORD", self.credentials.student.password.clone()),
        ];
        if let Some(ref dir) = self.output_dir {
            env.push(("E2E_OUTPUT", dir.display().to_string()));
        }
        if let Some(ref exe) = self.session.executable {
            env.push(("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH", exe.display().to_string()));
        }
        env
    }
}
