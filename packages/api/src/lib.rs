// ABOUTME: HTTP API layer for PlanKit providing REST endpoints and routing
// ABOUTME: Every route lives under /api and shares one AppState

use axum::{
    routing::{delete, get, patch, post, put},
    Extension, Router,
};
use plankit_storage::NamedResource;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod auth_handlers;
pub mod error;
pub mod health;
pub mod panic;
pub mod projects_handlers;
pub mod resources_handlers;
pub mod sections_handlers;
pub mod state;
pub mod users_handlers;

pub use error::{ApiResult, AppError};
pub use state::AppState;

/// Creates the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/me", get(auth_handlers::me))
}

/// Creates the user administration router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users_handlers::create_user))
        .route("/users", get(users_handlers::list_users))
        .route("/users/{user_id}", delete(users_handlers::delete_user))
        .route("/users/{user_id}/role", patch(users_handlers::update_user_role))
}

/// Creates the projects router
pub fn create_projects_router() -> Router<AppState> {
    Router::new()
        .route("/projects", post(projects_handlers::create_project))
        .route("/projects", get(projects_handlers::list_projects))
        .route("/projects/{project_id}", get(projects_handlers::get_project))
        .route("/projects/{project_id}", delete(projects_handlers::delete_project))
}

/// Routes for one named resource under `/projects/{project_id}/<path>`.
/// The resource reaches the handlers as an `Extension`.
fn named_resource_router(resource: NamedResource) -> Router<AppState> {
    let base = format!("/projects/{{project_id}}/{}", resource.path());

    let router = match resource {
        // `{entry}` is a field name for GET, an item id for PUT, and either for DELETE
        NamedResource::SingleEntry => Router::new()
            .route(&base, post(resources_handlers::upsert_single_entry))
            .route(&base, get(resources_handlers::list_items))
            .route(
                &format!("{}/{{entry}}", base),
                get(resources_handlers::get_single_entry)
                    .put(resources_handlers::update_item)
                    .delete(resources_handlers::delete_single_entry),
            ),
        NamedResource::ProjectDetails => Router::new()
            .route(&base, post(resources_handlers::create_item))
            .route(&base, get(resources_handlers::get_project_details))
            .route(
                &format!("{}/{{item_id}}", base),
                put(resources_handlers::update_item),
            )
            .route(
                &format!("{}/{{item_id}}", base),
                delete(resources_handlers::delete_item),
            ),
        _ => Router::new()
            .route(&base, post(resources_handlers::create_item))
            .route(&base, get(resources_handlers::list_items))
            .route(
                &format!("{}/{{item_id}}", base),
                put(resources_handlers::update_item),
            )
            .route(
                &format!("{}/{{item_id}}", base),
                delete(resources_handlers::delete_item),
            ),
    };

    router.layer(Extension(resource))
}

/// Creates the router for all named plan-document resources
pub fn create_resources_router() -> Router<AppState> {
    NamedResource::ALL
        .into_iter()
        .fold(Router::new(), |router, resource| {
            router.merge(named_resource_router(resource))
        })
}

/// Creates the generic section table router
pub fn create_sections_router() -> Router<AppState> {
    const TABLE: &str = "/projects/{project_id}/sections/{section}/tables/{table_name}";
    const ROW: &str = "/projects/{project_id}/sections/{section}/tables/{table_name}/{item_id}";

    Router::new()
        .route("/sections", get(sections_handlers::list_sections))
        .route(TABLE, post(sections_handlers::create_row))
        .route(TABLE, get(sections_handlers::list_rows))
        .route(ROW, put(sections_handlers::update_row))
        .route(ROW, delete(sections_handlers::delete_row))
}

/// The complete application: every router nested under `/api`, with request
/// tracing and panic recovery. CORS is left to the binary.
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .merge(create_auth_router())
        .merge(create_users_router())
        .merge(create_projects_router())
        .merge(create_resources_router())
        .merge(create_sections_router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(panic::create_panic_handler())
        .with_state(state)
}
