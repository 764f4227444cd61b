pub mod poller;
pub mod scenario;
pub mod state;
pub mod suite;

pub use poller::{PageState, PollSettings, Probe, Recognizer};
pub use scenario::{
    Expectation, FieldValue, FormSpec, Presence, Readiness, Scenario, ScenarioRunner, Step,
    Submission,
};
pub use state::*;
pub use suite::{run_all_suites, run_suite, SuiteOutcome};
