//! Application state.

use hookworks_scheduler::JobSender;

/// Server settings fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Owners allowed to trigger builds. Empty allows everyone.
    pub allowed_owners: Vec<String>,
}

impl Settings {
    pub fn owner_allowed(&self, owner: &str) -> bool {
        self.allowed_owners.is_empty() || self.allowed_owners.iter().any(|o| o == owner)
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobSender,
    pub settings: Settings,
}

impl AppState {
    pub fn new(jobs: JobSender, settings: Settings) -> Self {
        Self { jobs, settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allowlist_allows_everyone() {
        let settings = Settings::default();
        assert!(settings.owner_allowed("anyone"));
    }

    #[test]
    fn test_allowlist_is_exact_match() {
        let settings = Settings {
            allowed_owners: vec!["acme".to_string()],
        };
        assert!(settings.owner_allowed("acme"));
        assert!(!settings.owner_allowed("evil-acme"));
    }
}
