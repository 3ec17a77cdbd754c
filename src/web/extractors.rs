//! Request extractors

use axum::{
    extract::FromRequestParts,
    http::{Method, Uri, request::Parts},
};
use uuid::Uuid;

/// Request context information
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub user_agent: Option<String>,
    pub real_ip: Option<String>,
    pub request_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            user_agent: None,
            real_ip: None,
            request_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let real_ip = parts
            .headers
            .get("x-real-ip")
            .or_else(|| parts.headers.get("x-forwarded-for"))
            .and_then(|h| h.to_str().ok())
            .map(|s| s.split(',').next().unwrap_or(s).trim().to_string());

        let request_id = parts
            .headers
            .get("x-request-id")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            user_agent,
            real_ip,
            request_id,
            timestamp: chrono::Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn reads_forwarded_headers() {
        let (mut parts, _) = Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/kegiatan/1/tahap")
            .header("user-agent", "monitor/1.0")
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .header("x-request-id", "req-1")
            .body(())
            .unwrap()
            .into_parts();

        let context = RequestContext::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(context.method, Method::PUT);
        assert_eq!(context.uri.path(), "/api/v1/kegiatan/1/tahap");
        assert_eq!(context.user_agent.as_deref(), Some("monitor/1.0"));
        assert_eq!(context.real_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(context.request_id, "req-1");
    }
}
