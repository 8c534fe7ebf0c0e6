use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod blockchain;

// Create the ledger and seed a demo user so the identity endpoints can
// be exercised straight away
fn initialize_ledger() -> blockchain::Blockchain {
    let ledger = blockchain::Blockchain::new();

    let user = ledger.register_user("demo");
    info!("Registered demo user with uid: {}", user.uid);
    info!("Demo user recovery key: {}", user.recovery_key);

    ledger
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_chain,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::verify_transaction,
        api::handlers::mine_block,
        api::handlers::validate_chain,
        api::handlers::register_user,
        api::handlers::get_public_hash,
        api::handlers::get_user_transactions
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            blockchain::User,
            api::handlers::ChainResponse,
            api::handlers::TransactionResponse,
            api::handlers::VerifyResponse,
            api::handlers::MineResponse,
            api::handlers::RegisterUserRequest,
            api::handlers::PublicHashResponse
        )
    ),
    tags(
        (name = "ledger", description = "Ledger API endpoints")
    ),
    info(
        title = "KYC Ledger API",
        version = "1.0.0",
        description = "A single-node KYC ledger with proof-of-work mining",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Create the ledger with a demo user
    let ledger = web::Data::new(initialize_ledger());

    info!("Starting HTTP server at http://localhost:8080");

    // Start HTTP server
    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        // Configure OpenAPI documentation
        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(ledger.clone())
            // API routes
            .configure(api::configure_routes)
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await
}
