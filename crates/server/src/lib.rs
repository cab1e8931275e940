//! # Flickrview Server
//!
//! HTML views over the Flickr API: people lookup with a local person cache,
//! photo lists (interesting, top viewed, favorites, popular, group pools),
//! and the method explorer at `/explore/{method}`.
//!
//! Every remote call goes through the [`flickrview_explorer::RemoteEndpoint`]
//! held in [`AppState`], so the router can be exercised against a fake.

mod error;
mod explore;
mod people;
mod photos;
mod state;
mod templates;

use axum::extract::Request;
use axum::routing::get;
use axum::{Router, ServiceExt};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::AppError;
pub use people::{PeopleLookup, PeopleQuery, UserReference, classify};
pub use photos::{OwnerCount, PhotoView, count_owners, sort_by_views};
pub use state::AppState;

/// Build the application router. A trailing slash is trimmed before
/// routing, so `/interesting/` and `/interesting` are the same view.
pub fn router(state: AppState) -> NormalizePath<Router> {
    let routes = Router::new()
        .route("/", get(people::people))
        .route("/people", get(people::people))
        .route("/interesting", get(photos::interesting))
        .route("/favs", get(photos::own_favs))
        .route("/popular", get(photos::own_popular))
        .route("/favusers", get(photos::favusers))
        .route("/people/{userid}/top", get(photos::top))
        .route("/people/{userid}/groups", get(photos::groups))
        .route("/people/{userid}/favs", get(photos::favs))
        .route("/people/{userid}/popular", get(photos::popular))
        .route("/people/{userid}/{groupid}", get(photos::group_pool))
        .route("/explore/{method}", get(explore::show).post(explore::submit))
        .with_state(state)
        .layer(TraceLayer::new_for_http());
    NormalizePathLayer::trim_trailing_slash().layer(routes)
}

/// Serve the router on `bind` until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "flickrview listening");
    axum::serve(listener, ServiceExt::<Request>::into_make_service(router(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
