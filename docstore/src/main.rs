//! Document store server.
//!
//! ```bash
//! DATABASE_URL=sqlite://docs.db?mode=rwc cargo run
//! ```
//!
//! Then visit:
//! - **API**: <http://localhost:3000/documents>
//! - **Documentation**: <http://localhost:3000/docs>

use docstore::documents::Documents;
use docstore::migration::Migrator;
use docstore::{AppState, Config, router};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "docstore", description = "Document metadata store"))]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docstore=info,tower_http=info")),
        )
        .compact()
        .init();

    let config = Config::from_env()?;
    let db: DatabaseConnection = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let state = AppState {
        documents: Documents::new(db),
        max_upload_bytes: config.max_upload_bytes,
    };
    let (api, apidocs) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/documents", router(state))
        .split_for_parts();
    let app = api
        .merge(Scalar::with_url("/docs", apidocs))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(bind = %config.bind, "Serving documents and docs at /docs");
    axum::serve(listener, app).await?;
    Ok(())
}
