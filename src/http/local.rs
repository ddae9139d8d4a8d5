//! Local content for requests that are not proxied.

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::response::error_response;
use crate::routing::Site;

/// Serve `req` from the site's root directory, or 404 when it has none.
pub async fn serve(site: &Site, req: Request<Body>) -> Response<Body> {
    let Some(root) = site.config().serve.root.as_ref() else {
        return error_response(StatusCode::NOT_FOUND);
    };

    let service = ServeDir::new(root).append_index_html_on_directories(true);
    match service.oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}
