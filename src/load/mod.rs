//! HTTP load profile
//!
//! Virtual users that repeatedly GET weighted-random public routes with a
//! random think time in between. Shares nothing with the browser harness.

use anyhow::{Context, Result};
use colored::Colorize;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::common::resolve_url;

/// A route and its relative pick weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub weight: u32,
}

pub const ROUTES: &[Route] = &[
    Route { path: "/", weight: 3 },
    Route { path: "/StudentSignUp", weight: 2 },
    Route { path: "/OrgSignUp", weight: 2 },
    Route { path: "/login", weight: 1 },
];

#[derive(Debug, Clone)]
pub struct LoadProfile {
    pub base_url: String,
    pub users: usize,
    pub duration: Duration,
    /// Inclusive think time bounds between requests
    pub think_time: (Duration, Duration),
    pub routes: Vec<Route>,
}

impl LoadProfile {
    pub fn new(base_url: &str, users: usize, duration: Duration) -> Self {
        Self {
            base_url: base_url.to_string(),
            users,
            duration,
            think_time: (Duration::from_secs(1), Duration::from_secs(3)),
            routes: ROUTES.to_vec(),
        }
    }
}

/// Weighted route picker
pub struct RoutePicker {
    routes: Vec<Route>,
    index: WeightedIndex<u32>,
}

impl RoutePicker {
    pub fn new(routes: &[Route]) -> Result<Self> {
        let index = WeightedIndex::new(routes.iter().map(|r| r.weight))
            .context("Route weights must be positive")?;
        Ok(Self {
            routes: routes.to_vec(),
            index,
        })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> &Route {
        &self.routes[self.index.sample(rng)]
    }
}

/// One request outcome
#[derive(Debug, Clone)]
pub struct Sample {
    pub path: &'static str,
    pub latency: Duration,
    pub ok: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    pub requests: usize,
    pub failures: usize,
    pub mean_ms: f64,
    pub p95_ms: u64,
}

impl LoadStats {
    pub fn from_samples(samples: &[Sample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut latencies: Vec<u64> = samples
            .iter()
            .map(|s| s.latency.as_millis() as u64)
            .collect();
        latencies.sort_unstable();
        let total: u64 = latencies.iter().sum();

        Self {
            requests: samples.len(),
            failures: samples.iter().filter(|s| !s.ok).count(),
            mean_ms: total as f64 / latencies.len() as f64,
            p95_ms: percentile(&latencies, 0.95),
        }
    }
}

fn percentile(sorted: &[u64], p: f64) -> u64 {
    let len = sorted.len();
    if len == 0 {
        return 0;
    }
    let idx = ((len - 1) as f64 * p).round() as usize;
    sorted[idx.min(len - 1)]
}

/// Run the profile to completion and print a summary
pub async fn run_load(profile: &LoadProfile) -> Result<LoadStats> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;
    // validate weights once up front
    RoutePicker::new(&profile.routes)?;

    println!(
        "{} {} users for {}s against {}",
        "⚡".yellow(),
        profile.users,
        profile.duration.as_secs(),
        profile.base_url
    );

    let deadline = Instant::now() + profile.duration;
    let mut handles = Vec::with_capacity(profile.users);
    for user in 0..profile.users {
        let client = client.clone();
        let profile = profile.clone();
        handles.push(tokio::spawn(async move {
            virtual_user(user, client, profile, deadline).await
        }));
    }

    let mut samples = Vec::new();
    for handle in handles {
        samples.extend(handle.await.context("Virtual user task failed")??);
    }

    let stats = LoadStats::from_samples(&samples);
    println!(
        "  requests: {}  failures: {}  mean: {:.1}ms  p95: {}ms",
        stats.requests,
        if stats.failures == 0 {
            stats.failures.to_string().green()
        } else {
            stats.failures.to_string().red()
        },
        stats.mean_ms,
        stats.p95_ms
    );
    Ok(stats)
}

async fn virtual_user(
    user: usize,
    client: reqwest::Client,
    profile: LoadProfile,
    deadline: Instant,
) -> Result<Vec<Sample>> {
    let picker = RoutePicker::new(&profile.routes)?;
    let mut rng = StdRng::from_entropy();
    let (think_min, think_max) = profile.think_time;
    let mut samples = Vec::new();

    while Instant::now() < deadline {
        let route = picker.pick(&mut rng);
        let url = resolve_url(&profile.base_url, route.path);
        let start = Instant::now();
        let ok = match client.get(&url).send().await {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                log::warn!("user {}: GET {} failed: {}", user, url, e);
                false
            }
        };
        samples.push(Sample {
            path: route.path,
            latency: start.elapsed(),
            ok,
        });

        let think = rng.gen_range(think_min..=think_max);
        let remaining = deadline.saturating_duration_since(Instant::now());
        tokio::time::sleep(think.min(remaining)).await;
    }

    log::debug!("user {} finished after {} requests", user, samples.len());
    Ok(samples)
}
