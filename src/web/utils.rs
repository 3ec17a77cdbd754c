//! Web utility functions

use tracing::info;

use super::extractors::RequestContext;

/// Log an incoming HTTP request
pub fn log_request(context: &RequestContext) {
    info!(
        method = %context.method,
        uri = %context.uri,
        request_id = %context.request_id,
        user_agent = ?context.user_agent,
        real_ip = ?context.real_ip,
        "HTTP request"
    );
}
