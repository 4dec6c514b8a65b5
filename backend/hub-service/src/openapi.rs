/// OpenAPI documentation for the Union Hub API
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Union Hub API",
        version = "1.0.0",
        description = "Unions, chat groups, announcements, vault resources, and member management",
        contact(name = "Union Hub Team", email = "team@unionhub.app"),
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Development server"),
        (url = "https://api.unionhub.app", description = "Production server"),
    ),
    tags(
        (name = "Health", description = "Service health checks"),
        (name = "Profiles", description = "Member profiles and identity cards"),
        (name = "Unions", description = "Union creation, join, and membership"),
        (name = "Groups", description = "Chat groups"),
        (name = "Messages", description = "Message send, history, moderation"),
        (name = "Announcements", description = "Union announcements"),
        (name = "Vault", description = "Document vault resources"),
        (name = "Reports", description = "Member reports"),
        (name = "WebSocket", description = "Realtime delivery"),
    )
)]
pub struct ApiDoc;
