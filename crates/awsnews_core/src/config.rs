use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.aws-news.com/articles";
pub const DEFAULT_ALLOWED_DOMAIN: &str = "aws.amazon.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Article index endpoint
    pub api_url: String,
    /// Only pages under this host (or its subdomains) are fetched for content
    pub allowed_domain: String,
    /// How long a fetched snapshot is served before refetching
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            allowed_domain: DEFAULT_ALLOWED_DOMAIN.to_string(),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_allowed_domain(mut self, domain: impl Into<String>) -> Self {
        self.allowed_domain = domain.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Durations written the way people type them: `90`, `45s`, `5m`, `1h30m`, `1d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

const DURATION_TOO_LARGE: &str = "Duration is too large";

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    /// Parses `<number><unit>` groups; a trailing number without a unit counts as seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut rest = s.trim();
        if rest.is_empty() {
            return Err("Duration cannot be empty".to_string());
        }

        let mut total_seconds: u64 = 0;
        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Expected a number in duration {:?}", s));
            }

            let (number, tail) = rest.split_at(digits);
            let mut chars = tail.chars();
            let scale = match chars.next() {
                None => 1,
                Some(unit) => unit_seconds(unit)
                    .ok_or_else(|| format!("Invalid duration unit: {}", unit))?,
            };

            let value: u64 = number.parse().map_err(|_| DURATION_TOO_LARGE.to_string())?;
            total_seconds = value
                .checked_mul(scale)
                .and_then(|seconds| total_seconds.checked_add(seconds))
                .ok_or_else(|| DURATION_TOO_LARGE.to_string())?;

            rest = chars.as_str().trim_start();
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.allowed_domain, "aws.amazon.com");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_human_duration() {
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("5m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(300));
        assert_eq!("1h30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5400));
        assert_eq!("1d".parse::<HumanDuration>().unwrap().0, Duration::from_secs(86400));
        assert!("5x".parse::<HumanDuration>().is_err());
        assert!("m".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert_eq!("1h30".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3630));
        assert_eq!("1h 30m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(5400));
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        for raw in [
            "300000000000000d",
            "18446744073709551615s1s",
            "99999999999999999999",
        ] {
            let err = raw.parse::<HumanDuration>().unwrap_err();
            assert_eq!(err, "Duration is too large", "{}", raw);
        }
        assert_eq!(
            "18446744073709551615".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(u64::MAX)
        );
    }
}
