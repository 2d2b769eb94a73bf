//! Push event parsing for Git provider webhooks.

use serde::{Deserialize, Serialize};

/// Parsed push event data: new commits were pushed to a monitored
/// repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEvent {
    pub r#ref: String,
    pub after: String,
    pub owner: String,
    pub repository: String,
    pub clone_url: String,
    pub branch: Option<String>,
    pub pusher: String,
}

impl PushEvent {
    /// Parse a GitHub push webhook payload.
    pub fn from_github_payload(payload: &serde_json::Value) -> Option<Self> {
        let r#ref = payload.get("ref")?.as_str()?.to_string();
        let after = payload
            .get("after")
            .and_then(|a| a.as_str())
            .unwrap_or_default()
            .to_string();

        let repo = payload.get("repository")?;
        let repository = repo.get("name")?.as_str()?.to_string();
        let owner = repo
            .get("owner")
            .and_then(|o| o.get("name").or_else(|| o.get("login")))
            .and_then(|n| n.as_str())?
            .to_string();
        let clone_url = repo
            .get("clone_url")
            .or_else(|| repo.get("url"))
            .and_then(|u| u.as_str())?
            .to_string();

        let branch = r#ref.strip_prefix("refs/heads/").map(String::from);

        let pusher = payload
            .get("pusher")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("unknown")
            .to_string();

        Some(PushEvent {
            r#ref,
            after,
            owner,
            repository,
            clone_url,
            branch,
            pusher,
        })
    }

    /// Stable job name for this owner and repository pair.
    pub fn job_name(&self) -> String {
        format!("{}-{}", self.owner, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "ref": "refs/heads/main",
            "before": "0000000000000000000000000000000000000000",
            "after": "1111222233334444555566667777888899990000",
            "repository": {
                "name": "widgets",
                "full_name": "acme/widgets",
                "clone_url": "https://example.com/acme/widgets.git",
                "owner": { "name": "acme" }
            },
            "pusher": { "name": "alice" }
        })
    }

    #[test]
    fn test_parse_push_payload() {
        let event = PushEvent::from_github_payload(&sample_payload()).unwrap();
        assert_eq!(event.owner, "acme");
        assert_eq!(event.repository, "widgets");
        assert_eq!(event.clone_url, "https://example.com/acme/widgets.git");
        assert_eq!(event.branch.as_deref(), Some("main"));
        assert_eq!(event.pusher, "alice");
        assert_eq!(event.job_name(), "acme-widgets");
    }

    #[test]
    fn test_tag_ref_has_no_branch() {
        let mut payload = sample_payload();
        payload["ref"] = json!("refs/tags/v1.0");
        let event = PushEvent::from_github_payload(&payload).unwrap();
        assert_eq!(event.branch, None);
    }

    #[test]
    fn test_owner_login_fallback() {
        let mut payload = sample_payload();
        payload["repository"]["owner"] = json!({ "login": "acme" });
        let event = PushEvent::from_github_payload(&payload).unwrap();
        assert_eq!(event.owner, "acme");
    }

    #[test]
    fn test_missing_repository_is_rejected() {
        let payload = json!({ "ref": "refs/heads/main" });
        assert!(PushEvent::from_github_payload(&payload).is_none());
    }
}
