// src/checker/resolve.rs
// =============================================================================
// DNS resolution step of a URL check.
//
// Resolution runs before any HTTP request so a missing host is reported as
// a DNS failure rather than a generic connection error. It sits behind a
// trait so tests (and embedders) can supply their own resolver.
// =============================================================================

use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The name does not exist. Final: the URL is a DNS failure.
    #[error("host not found: {0}")]
    NotFound(String),

    /// The resolver itself is not working. The URL cannot be verified.
    #[error("resolver unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, host: &str, port: u16) -> Result<(), ResolveError>;
}

/// Resolves through the operating system (getaddrinfo via tokio).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<(), ResolveError> {
        // IP literals need no lookup. Url keeps IPv6 hosts in brackets.
        if host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>().is_ok() {
            return Ok(());
        }

        match tokio::net::lookup_host((host, port)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(_) => Ok(()),
                None => Err(ResolveError::NotFound(format!("{host} has no addresses"))),
            },
            Err(e) => Err(classify_lookup_error(host, &e.to_string())),
        }
    }
}

// getaddrinfo only reports failures as text, so the temporary cases are
// recognised by their wording; everything else means the name is unknown.
fn classify_lookup_error(host: &str, message: &str) -> ResolveError {
    let lower = message.to_lowercase();
    if lower.contains("temporary failure") || lower.contains("try again") {
        ResolveError::Unavailable(format!("{host}: {message}"))
    } else {
        ResolveError::NotFound(format!("{host}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literals_skip_lookup() {
        assert!(SystemResolver.resolve("127.0.0.1", 80).await.is_ok());
        assert!(SystemResolver.resolve("[::1]", 80).await.is_ok());
    }

    #[test]
    fn test_lookup_error_classification() {
        assert!(matches!(
            classify_lookup_error("x", "failed to lookup address information: Name or service not known"),
            ResolveError::NotFound(_)
        ));
        assert!(matches!(
            classify_lookup_error("x", "Temporary failure in name resolution"),
            ResolveError::Unavailable(_)
        ));
    }
}
