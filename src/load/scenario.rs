//! Load test scenarios.

use serde::{Deserialize, Serialize};

/// A scenario as written in config: relative path plus labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
}

impl ScenarioConfig {
    pub fn new(name: &str, path: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }

    /// Default endpoint menu. `/error` is included so failures show up in telemetry.
    pub fn defaults() -> Vec<ScenarioConfig> {
        vec![
            ScenarioConfig::new("home", "/", "Plain text home page, may cascade to /health"),
            ScenarioConfig::new("health", "/health", "Health check JSON"),
            ScenarioConfig::new("test-logs", "/test-logs", "Logs at three levels"),
            ScenarioConfig::new("trace-test", "/trace-test", "Span around an external call"),
            ScenarioConfig::new("error", "/error", "Simulated server error"),
        ]
    }
}

/// A resolved scenario: (name, target URL, description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub name: String,
    pub url: String,
    pub description: String,
}

/// Resolve configured scenarios against the service's base URL.
pub fn build_scenarios(base_url: &str, configs: &[ScenarioConfig]) -> Vec<Scenario> {
    let base = base_url.trim_end_matches('/');
    configs
        .iter()
        .map(|c| Scenario {
            name: c.name.clone(),
            url: format!("{}{}", base, c.path),
            description: c.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scenarios_keeps_order() {
        let scenarios = build_scenarios("http://127.0.0.1:8080/", &ScenarioConfig::defaults());
        let urls: Vec<_> = scenarios.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://127.0.0.1:8080/",
                "http://127.0.0.1:8080/health",
                "http://127.0.0.1:8080/test-logs",
                "http://127.0.0.1:8080/trace-test",
                "http://127.0.0.1:8080/error",
            ]
        );
        assert_eq!(scenarios[1].name, "health");
    }
}
