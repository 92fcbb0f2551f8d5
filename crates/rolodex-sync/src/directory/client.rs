#[cfg(feature = "directory-sync")]
mod imp {
    use crate::directory::DirectoryEnvelope;
    use crate::directory::RawBusiness;
    use crate::source::DirectorySource;
    use crate::{Result, SyncError};
    use reqwest::blocking::Client;
    use std::time::Duration;

    const LIST_PATH: &str = "/api/admin/businesses";

    #[derive(Debug, Clone)]
    pub struct HttpDirectorySource {
        base_url: String,
        api_key: String,
        timeout: Duration,
        user_agent: Option<String>,
    }

    impl HttpDirectorySource {
        pub fn new(
            base_url: String,
            api_key: String,
            timeout: Duration,
            user_agent: Option<String>,
        ) -> Self {
            Self {
                base_url,
                api_key,
                timeout,
                user_agent,
            }
        }

        pub fn endpoint(&self) -> String {
            listing_url(&self.base_url)
        }
    }

    impl DirectorySource for HttpDirectorySource {
        fn source_name(&self) -> &'static str {
            "directory-api"
        }

        fn fetch_businesses(&self) -> Result<Vec<RawBusiness>> {
            let client = Client::builder()
                .user_agent(self.user_agent.as_deref().unwrap_or("rolodex"))
                .timeout(self.timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()?;

            let url = self.endpoint();
            tracing::debug!(%url, "fetching directory businesses");
            let response = client
                .get(&url)
                .header("x-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .send()?;

            let status = response.status();
            let body = response.text()?;
            if !status.is_success() {
                return Err(SyncError::Remote(remote_message(status.as_u16(), &body)));
            }

            let envelope: DirectoryEnvelope = serde_json::from_str(&body)?;
            Ok(envelope.businesses)
        }
    }

    pub(super) fn listing_url(base_url: &str) -> String {
        let base = base_url.trim().trim_end_matches('/');
        format!("{base}{LIST_PATH}")
    }

    /// Prefers the vendor's own `message` field over the bare status code.
    pub(super) fn remote_message(status: u16, body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
            })
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("failed to fetch directory businesses (HTTP {status})"))
    }

}

#[cfg(not(feature = "directory-sync"))]
mod imp {
    use crate::directory::RawBusiness;
    use crate::source::DirectorySource;
    use crate::{Result, SyncError};
    use std::time::Duration;

    #[derive(Debug, Clone)]
    pub struct HttpDirectorySource {
        base_url: String,
        api_key: String,
        timeout: Duration,
        user_agent: Option<String>,
    }

    impl HttpDirectorySource {
        pub fn new(
            base_url: String,
            api_key: String,
            timeout: Duration,
            user_agent: Option<String>,
        ) -> Self {
            Self {
                base_url,
                api_key,
                timeout,
                user_agent,
            }
        }
    }

    impl DirectorySource for HttpDirectorySource {
        fn source_name(&self) -> &'static str {
            "directory-api"
        }

        fn fetch_businesses(&self) -> Result<Vec<RawBusiness>> {
            let _ = (&self.base_url, &self.api_key, &self.timeout, &self.user_agent);
            Err(SyncError::Unavailable(
                "directory sync over HTTP requires the directory-sync feature".to_string(),
            ))
        }
    }
}

pub use imp::HttpDirectorySource;
