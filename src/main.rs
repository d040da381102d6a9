use social_api::{AppState, Config, app, services::seed_groups_from_file};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().expect("invalid configuration");
    let addr = config.bind_addr;
    let prefix = config.api_prefix.clone();

    // Create application state
    let state = AppState::new(config);
    if let Some(path) = state.config.groups_file.clone() {
        seed_groups_from_file(&state.store, &path).expect("failed to seed groups");
    }

    let app = app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /health");
    info!("  POST   {prefix}/auth/users/             - Create account");
    info!("  POST   {prefix}/auth/jwt/create/        - Obtain token");
    info!("  GET    {prefix}/posts/                  - List posts");
    info!("  POST   {prefix}/posts/                  - Create post (auth)");
    info!("  *      {prefix}/posts/{{id}}/             - Post detail (owner writes)");
    info!("  *      {prefix}/posts/{{id}}/comments/    - Comments of a post");
    info!("  GET    {prefix}/groups/                 - List groups");
    info!("  GET    {prefix}/follow/                 - Own follows (auth)");
    info!("  POST   {prefix}/follow/                 - Follow a user (auth)");

    axum::serve(listener, app).await.expect("server error");
}
