use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{crud, system};
use crate::resources::{
    Break, Field, Group, Level, Resource, Schedule, School, Subject, Teacher, TeacherField, User,
};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        // Resources
        .merge(resource_routes::<School>())
        .merge(resource_routes::<User>())
        .merge(resource_routes::<Teacher>())
        .merge(resource_routes::<Field>())
        .merge(resource_routes::<TeacherField>())
        .merge(resource_routes::<Schedule>())
        .merge(resource_routes::<Break>())
        .merge(resource_routes::<Level>())
        .merge(resource_routes::<Group>())
        .merge(resource_routes::<Subject>())
        .fallback(system::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    } else {
        router
    }
}

/// Collection and item routes for one resource
fn resource_routes<R: Resource>() -> Router<AppState> {
    let base = format!("/api/v1/{}", R::COLLECTION.path());

    Router::new()
        .route(&base, get(crud::list::<R>).post(crud::create::<R>))
        .route(&format!("{}/", base), get(crud::list::<R>).post(crud::create::<R>))
        .route(
            &format!("{}/:id", base),
            get(crud::get::<R>).put(crud::update::<R>).delete(crud::delete::<R>),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
