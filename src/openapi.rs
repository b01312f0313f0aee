//! OpenAPI documentation
//!
//! The generated document is served at `/openapi.json` and browsable through
//! the Swagger UI at `/swagger-ui`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Spiral Knights Api",
        description = "Spiral Knights unofficial public REST API",
        contact(
            name = "azzerial",
            url = "https://github.com/azzerial",
            email = "robin@azzerial.net"
        ),
        license(
            name = "Apache License 2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.txt"
        )
    ),
    paths(
        crate::api::exchange::market,
        crate::api::exchange::last_price,
        crate::api::exchange::buy_offers,
        crate::api::exchange::sell_offers,
    ),
    components(schemas(
        crate::models::Market,
        crate::models::Offer,
        crate::error::ErrorResponse,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "Exchange Market", description = "Live exchange market data")
    )
)]
pub struct ApiDoc;

/// Path where the OpenAPI document is served
pub const DOCS_PATH: &str = "/openapi.json";
