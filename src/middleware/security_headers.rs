use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; img-src 'self' data: blob:; \
     style-src 'self' 'unsafe-inline'; script-src 'self'; frame-ancestors 'none'";

const HSTS: &str = "max-age=31536000; includeSubDomains";

fn headers(security: &SecurityConfig) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        (header::REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin")),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ),
        (header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(CONTENT_SECURITY_POLICY)),
    ];
    if security.hsts {
        headers.push((header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS)));
    }
    headers
}

/// Adds the browser hardening headers to every response that lacks them.
pub fn with_security_headers<S>(mut router: Router<S>, security: &SecurityConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if !security.security_headers {
        return router;
    }
    for (name, value) in headers(security) {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }
    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn hsts_only_when_enabled() {
        let mut config = AppConfig::development();
        assert!(!headers(&config.security)
            .iter()
            .any(|(name, _)| name == header::STRICT_TRANSPORT_SECURITY));

        config.security.hsts = true;
        assert!(headers(&config.security)
            .iter()
            .any(|(name, _)| name == header::STRICT_TRANSPORT_SECURITY));
    }
}
