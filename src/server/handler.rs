//! The request handler callback.

use crate::parser::HttpRequest;
use crate::server::HttpResponse;

/// Maps a parsed request to a response.
///
/// Handlers are shared by every connection task and may be called from
/// several of them at once. They always produce a response; error outcomes
/// are expressed through the status code.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &HttpRequest) -> HttpResponse;
}

impl<F> Handler for F
where
    F: Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static,
{
    fn handle(&self, request: &HttpRequest) -> HttpResponse {
        self(request)
    }
}
