//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::RegisterData;
use crate::error::{AppError, AppResult};
use crate::model::{User, Wallet};

use super::middleware::{auth_middleware, AuthUser};
use super::pagination::PageQuery;
use super::response::ApiResponse;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub narration: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WithdrawRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub amount: Decimal,
    pub counterparty_id: Uuid,
    #[serde(default)]
    pub narration: Option<String>,
}

/// User joined with their wallet (or null when provisioning is pending or
/// failed).
#[derive(Debug, Serialize)]
pub struct UserWithWallet {
    #[serde(flatten)]
    pub user: User,
    pub wallet: Option<Wallet>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthBody {
    pub user: UserWithWallet,
    pub access_token: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/transaction", get(get_transactions))
        .route("/transaction/deposit", post(deposit))
        .route("/transaction/withdraw", post(withdraw))
        .route("/transaction/transfer", post(transfer))
        .route("/wallet/balance", get(get_balance))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(protected)
        .with_state(state)
}

// =========================================================================
// POST /auth/register
// =========================================================================

/// Register a new user and issue a session token.
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    require_field(&request.email, "email")?;
    require_field(&request.password, "password")?;

    let (user, wallet) = state
        .auth
        .register_user(RegisterData {
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: request.phone_number,
        })
        .await?;

    let token = state.tokens.issue(user.id, &user.email)?;
    let cookie = session_cookie(&token, state.tokens.max_age_secs(), state.secure_cookies);

    let body = ApiResponse::new(
        201,
        "User created successfully",
        AuthBody {
            user: UserWithWallet { user, wallet },
            access_token: token,
        },
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(body),
    )
        .into_response())
}

// =========================================================================
// POST /auth/login
// =========================================================================

/// Verify credentials and issue a session token.
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AppError> {
    require_field(&request.email, "email")?;
    require_field(&request.password, "password")?;

    let (user, wallet) = state.auth.login_user(&request.email, &request.password).await?;

    let token = state.tokens.issue(user.id, &user.email)?;
    let cookie = session_cookie(&token, state.tokens.max_age_secs(), state.secure_cookies);

    let body = ApiResponse::new(
        200,
        "Login successfully",
        AuthBody {
            user: UserWithWallet { user, wallet },
            access_token: token,
        },
    );

    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// =========================================================================
// GET /transaction
// =========================================================================

/// Page through the caller's ledger history.
async fn get_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let (filter, page) = query.into_parts()?;
    let (rows, meta) = state.ledger.get_transactions(auth.id, filter, page).await?;

    Ok(ApiResponse::paginated("transactions fetched successfully", rows, meta).into_response())
}

// =========================================================================
// POST /transaction/deposit
// =========================================================================

/// Credit the caller's wallet.
async fn deposit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<DepositRequest>,
) -> Result<Response, AppError> {
    let amount = validate_amount(request.amount)?;
    let created = state.ledger.deposit(auth.id, amount, request.narration).await?;

    Ok(ApiResponse::success("Deposit successful", created).into_response())
}

// =========================================================================
// POST /transaction/withdraw
// =========================================================================

/// Debit the caller's wallet.
async fn withdraw(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Response, AppError> {
    let amount = validate_amount(request.amount)?;
    let created = state.ledger.withdraw(auth.id, amount).await?;

    Ok(ApiResponse::success("Withdrawal successful", created).into_response())
}

// =========================================================================
// POST /transaction/transfer
// =========================================================================

/// Move funds from the caller to another user. Returns the debit leg.
async fn transfer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<TransferRequest>,
) -> Result<Response, AppError> {
    if request.counterparty_id == auth.id {
        return Err(AppError::BadRequest(
            "Cannot transfer to the same account.".to_string(),
        ));
    }

    let amount = validate_amount(request.amount)?;
    let created = state
        .ledger
        .transfer(auth.id, request.counterparty_id, amount, request.narration)
        .await?;

    Ok(ApiResponse::success("Transfer successful", created).into_response())
}

// =========================================================================
// GET /wallet/balance
// =========================================================================

/// Current wallet for the caller.
async fn get_balance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response, AppError> {
    let wallet = state.ledger.get_balance(auth.id).await?;

    Ok(ApiResponse::success("Wallet fetched successfully", wallet).into_response())
}

// =========================================================================
// Payload validation
// =========================================================================

const MIN_AMOUNT: i64 = 100;
const MAX_AMOUNT: i64 = 1_000_000;

/// Surface-level amount rules: a positive whole number of currency units
/// within the demo's accepted range. The ledger core re-validates
/// positivity and sufficiency on its own.
fn validate_amount(amount: Decimal) -> AppResult<Decimal> {
    if amount != amount.trunc() {
        return Err(AppError::BadRequest("amount: Expected integer".to_string()));
    }
    if amount < Decimal::from(MIN_AMOUNT) {
        return Err(AppError::BadRequest(format!(
            "amount: Must be >= {MIN_AMOUNT}"
        )));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(AppError::BadRequest(format!(
            "amount: Must be <= {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

fn require_field(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field}: Required")));
    }
    Ok(())
}

/// HttpOnly session cookie mirroring the token in the response body.
/// `secure` is set in production, where the app is served over TLS.
fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("accessToken={token}; HttpOnly; Path=/; Max-Age={max_age_secs}; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialize() {
        let json = r#"{
            "email": "john@gmail.com",
            "password": "hunter2",
            "firstName": "John"
        }"#;

        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "john@gmail.com");
        assert_eq!(request.first_name, Some("John".to_string()));
        assert!(request.last_name.is_none());
    }

    #[test]
    fn test_transfer_request_deserialize() {
        let json = r#"{
            "amount": 200,
            "counterpartyId": "550e8400-e29b-41d4-a716-446655440002",
            "narration": "Rent"
        }"#;

        let request: TransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.amount, Decimal::from(200));
        assert_eq!(request.narration, Some("Rent".to_string()));
    }

    #[test]
    fn test_validate_amount_bounds() {
        assert!(validate_amount(Decimal::from(100)).is_ok());
        assert!(validate_amount(Decimal::from(1_000_000)).is_ok());

        let err = validate_amount(Decimal::from(99)).unwrap_err();
        assert_eq!(err.to_string(), "amount: Must be >= 100");

        let err = validate_amount(Decimal::from(1_000_001)).unwrap_err();
        assert_eq!(err.to_string(), "amount: Must be <= 1000000");
    }

    #[test]
    fn test_validate_amount_rejects_zero_and_negative() {
        // below the lower bound either way, with no side effects possible
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::from(-500)).is_err());
    }

    #[test]
    fn test_validate_amount_rejects_fractions() {
        let err = validate_amount(Decimal::new(10050, 2)).unwrap_err();
        assert_eq!(err.to_string(), "amount: Expected integer");

        // a trailing .00 is still an integer
        assert!(validate_amount(Decimal::new(10000, 2)).is_ok());
    }

    #[test]
    fn test_require_field() {
        assert!(require_field("john@gmail.com", "email").is_ok());
        let err = require_field("  ", "email").unwrap_err();
        assert_eq!(err.to_string(), "email: Required");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi", 86400, false);
        assert!(cookie.starts_with("accessToken=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let cookie = session_cookie("abc.def.ghi", 86400, true);
        assert!(cookie.ends_with("; Secure"));
    }
}
