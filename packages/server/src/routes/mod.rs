use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn file_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::upload::upload_file))
        .layer(handlers::upload::upload_body_limit(
            config.upload_body_limit(),
        ));

    OpenApiRouter::new()
        .routes(routes!(handlers::search::search_files))
        // Wildcard captures are registered outside `routes!`; documented via `ApiDoc`.
        .route(
            "/download/{*file}",
            get(handlers::download::download_file),
        )
        .merge(upload)
}
