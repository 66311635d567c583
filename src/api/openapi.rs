//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{data, health},
    error::ErrorResponse,
    models::{NormalizedUnit, QueueUnit, VaccineAvailability},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Onde 2a Dose API",
        version = "0.1.0",
        description = "Relay for São Paulo's De Olho na Fila vaccination queue data",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        health::health_check,
        health::readiness_check,
        data::raw_data,
        data::normalized_data,
    ),
    components(
        schemas(
            health::HealthResponse,
            health::ReadinessResponse,
            QueueUnit,
            NormalizedUnit,
            VaccineAvailability,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "data", description = "Vaccination queue data")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
