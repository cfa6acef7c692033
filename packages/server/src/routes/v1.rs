use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .routes(routes!(
            handlers::video::list_videos,
            handlers::video::upload_video
        ))
        .routes(routes!(
            handlers::video::download_video,
            handlers::video::delete_video
        ))
        .routes(routes!(handlers::video::locate_video))
        .nest("/admin", admin_routes())
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::admin::list_orphans))
}
