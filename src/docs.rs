use crate::modules::video::dto::HealthResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::video::handler::index,
        crate::modules::video::handler::generate,
        crate::modules::video::handler::health,
    ),
    components(
        schemas(HealthResponse)
    ),
    tags(
        (name = "Video", description = "Still image + audio to MP4"),
        (name = "System", description = "Service health")
    )
)]
pub struct ApiDoc;
