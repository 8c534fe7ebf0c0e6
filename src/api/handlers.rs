use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{Block, Blockchain, Transaction, User};

use super::error::ApiError;

/// Data structure for the ledger state
pub type LedgerData = web::Data<Blockchain>;

/// Response for the chain endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The length of the chain
    pub length: usize,

    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// The configured mining difficulty
    pub difficulty: usize,

    /// Whether the chain is valid
    pub is_valid: bool,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    /// The message
    pub message: String,

    /// The index of the block that will include this transaction
    pub block_index: u64,
}

/// Response for the verify endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether a matching pending transaction was found
    pub verified: bool,

    /// The message
    pub message: String,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    /// The message
    pub message: String,

    /// The newly mined block
    pub block: Block,
}

/// Request for the user registration endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Display name for the new user
    pub name: String,
}

/// Response for the public hash endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct PublicHashResponse {
    /// The user's uid
    pub uid: String,

    /// The derived public hash
    pub public_hash: String,
}

/// Get the full chain
///
/// Returns the entire chain and its validity status
#[utoipa::path(
    get,
    path = "/api/v1/chain",
    responses(
        (status = 200, description = "Chain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(ledger: LedgerData) -> impl Responder {
    let chain = ledger.get_chain();
    let is_valid = ledger.is_valid();

    let response = ChainResponse {
        length: chain.len(),
        chain,
        difficulty: ledger.difficulty(),
        is_valid,
    };

    HttpResponse::Ok().json(response)
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(ledger: LedgerData) -> impl Responder {
    let transactions = ledger.get_pending_transactions();
    HttpResponse::Ok().json(transactions)
}

/// Submit a new transaction
///
/// Appends the transaction to the pending pool. Any fields beyond
/// `user_id` are carried opaquely.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = Transaction,
    responses(
        (status = 201, description = "Transaction accepted", body = TransactionResponse),
        (status = 400, description = "Invalid transaction data")
    )
)]
pub async fn new_transaction(
    ledger: LedgerData,
    transaction: web::Json<Transaction>,
) -> impl Responder {
    let block_index = ledger.latest_block().index + 1;
    ledger.add_transaction(transaction.into_inner());

    HttpResponse::Created().json(TransactionResponse {
        message: "Transaction added to pending pool".to_string(),
        block_index,
    })
}

/// Verify a transaction against the pending pool
///
/// Returns true only if a structurally identical transaction is
/// currently pending; mined transactions no longer verify.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/verify",
    request_body = Transaction,
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse)
    )
)]
pub async fn verify_transaction(
    ledger: LedgerData,
    transaction: web::Json<Transaction>,
) -> impl Responder {
    let verified = ledger.verify_transaction(&transaction);

    let message = if verified {
        "KYC verification successful".to_string()
    } else {
        "KYC verification unsuccessful, please verify manually".to_string()
    };

    HttpResponse::Ok().json(VerifyResponse { verified, message })
}

/// Mine the pending pool into a new block
///
/// Blocks until proof of work completes, then returns the new block
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    responses(
        (status = 200, description = "Block mined successfully", body = MineResponse)
    )
)]
pub async fn mine_block(ledger: LedgerData) -> impl Responder {
    let block = ledger.mine_pending_transactions();

    HttpResponse::Ok().json(MineResponse {
        message: format!("Block {} mined", block.index),
        block,
    })
}

/// Register a new user
///
/// Mints a uid, private hash and recovery key; the returned record is
/// the caller's only chance to note the recovery key
#[utoipa::path(
    post,
    path = "/api/v1/users/new",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = User)
    )
)]
pub async fn register_user(
    ledger: LedgerData,
    request: web::Json<RegisterUserRequest>,
) -> impl Responder {
    let user = ledger.register_user(request.name.clone());
    HttpResponse::Created().json(user)
}

/// Derive a user's public hash
///
/// Returns 404 when the private hash or recovery key is missing
#[utoipa::path(
    get,
    path = "/api/v1/users/{uid}/public-hash",
    params(
        ("uid" = String, Path, description = "The user's uid")
    ),
    responses(
        (status = 200, description = "Public hash derived", body = PublicHashResponse),
        (status = 404, description = "Missing private hash or recovery key")
    )
)]
pub async fn get_public_hash(
    ledger: LedgerData,
    uid: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let uid = uid.into_inner();

    let public_hash = ledger
        .generate_public_hash(&uid)
        .ok_or_else(|| ApiError::MissingCredentials(uid.clone()))?;

    Ok(HttpResponse::Ok().json(PublicHashResponse { uid, public_hash }))
}

/// Get a user's mined transactions
///
/// Returns every transaction for the user across all mined blocks, in
/// chain order; pending transactions are excluded
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/transactions",
    params(
        ("user_id" = String, Path, description = "The user id to filter by")
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_user_transactions(
    ledger: LedgerData,
    user_id: web::Path<String>,
) -> impl Responder {
    let transactions = ledger.view_user(&user_id);
    HttpResponse::Ok().json(transactions)
}

/// Validate the chain
///
/// Recomputes every block hash and checks linkage and proof of work
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Validation result")
    )
)]
pub async fn validate_chain(ledger: LedgerData) -> impl Responder {
    let is_valid = ledger.is_valid();
    HttpResponse::Ok().json(serde_json::json!({ "is_valid": is_valid }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    macro_rules! test_app {
        ($ledger:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($ledger))
                    .configure(crate::api::configure_routes),
            )
        };
    }

    #[actix_web::test]
    async fn test_chain_endpoint_returns_genesis() {
        let app = test_app!(Blockchain::with_difficulty(1)).await;

        let req = test::TestRequest::get().uri("/api/v1/chain").to_request();
        let response: ChainResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response.length, 1);
        assert_eq!(response.difficulty, 1);
        assert!(response.is_valid);
        assert_eq!(response.chain[0].index, 0);
    }

    #[actix_web::test]
    async fn test_submit_mine_and_view_flow() {
        let app = test_app!(Blockchain::with_difficulty(1)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new")
            .set_json(serde_json::json!({ "user_id": "u1", "document": "passport" }))
            .to_request();
        let submitted: TransactionResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(submitted.block_index, 1);

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        let mined: MineResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(mined.block.index, 1);
        assert_eq!(mined.block.transactions.len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/v1/users/u1/transactions")
            .to_request();
        let transactions: Vec<Transaction> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].user_id, "u1");
    }

    #[actix_web::test]
    async fn test_verify_endpoint_pool_scope() {
        let app = test_app!(Blockchain::with_difficulty(1)).await;
        let body = serde_json::json!({ "user_id": "u1", "document": "passport" });

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new")
            .set_json(&body)
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/verify")
            .set_json(&body)
            .to_request();
        let response: VerifyResponse = test::call_and_read_body_json(&app, req).await;
        assert!(response.verified);

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/verify")
            .set_json(&body)
            .to_request();
        let response: VerifyResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!response.verified);
    }

    #[actix_web::test]
    async fn test_public_hash_endpoint() {
        let ledger = Blockchain::with_difficulty(1);
        let user = ledger.register_user("alice");
        let app = test_app!(ledger).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}/public-hash", user.uid))
            .to_request();
        let response: PublicHashResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(response.uid, user.uid);
        assert_eq!(response.public_hash.len(), 64);

        let req = test::TestRequest::get()
            .uri("/api/v1/users/nobody/public-hash")
            .to_request();
        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
