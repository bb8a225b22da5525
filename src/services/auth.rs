//! Authentication: role-checked logins and registrations on top of the
//! external auth provider, plus local validation of its access tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::admin::{self, AdminAccount, AdminContact};
use crate::models::business::{Business, CreateBusiness};
use crate::models::client::{Client, CreateClient};
use crate::services::{business as business_service, client as client_service};
use crate::store::auth::{Session, SignUpOutcome};
use crate::store::{AuthClient, Query, StoreClient, StoreError};

/// Audience the auth provider stamps on user access tokens.
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Claims of a provider-issued access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Business,
    Client,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminRegistration {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BusinessRegistration {
    #[validate(length(min = 1, message = "is required"))]
    pub business_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub owner_name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "is required"))]
    pub city: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientRegistration {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Tokens handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<&Session> for SessionTokens {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            token_type: session.token_type.clone(),
            expires_in: session.expires_in,
        }
    }
}

/// Successful login or registration. `session` is absent when the provider
/// requires email confirmation before the first sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub session: Option<SessionTokens>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
}

/// The signed-in user and the roles they hold.
#[derive(Debug, Serialize)]
pub struct Me {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub is_admin: bool,
    pub business: Option<Business>,
}

/// Validate a provider access token and return its claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Sign-in rejections from the provider mean bad credentials.
fn sign_in_error(e: StoreError) -> AppError {
    match e.status() {
        Some(400 | 401 | 422) => AppError::InvalidCredentials,
        _ => AppError::Store(e),
    }
}

fn sign_up_error(e: StoreError) -> AppError {
    match &e {
        StoreError::Api { code: Some(code), .. }
            if code == "user_already_exists" || code == "email_exists" =>
        {
            AppError::Conflict("An account with this email already exists".to_string())
        }
        StoreError::Api {
            status: 400 | 422,
            message,
            ..
        } => AppError::Validation(message.clone()),
        _ => AppError::Store(e),
    }
}

/// Drop the session of a login that failed its role check.
async fn revoke(auth: &AuthClient, session: &Session) {
    if let Err(e) = auth.sign_out(&session.access_token).await {
        tracing::warn!(error = %e, user_id = %session.user.id, "Failed to revoke session");
    }
}

/// Unwrap the role row of a fresh login. A missing row or a failed lookup
/// revokes the session before the error goes back.
async fn require_role<T>(
    auth: &AuthClient,
    session: &Session,
    lookup: Result<Option<T>, AppError>,
    denied: &str,
) -> Result<T, AppError> {
    match lookup {
        Ok(Some(row)) => Ok(row),
        Ok(None) => {
            revoke(auth, session).await;
            Err(AppError::Forbidden(denied.to_string()))
        }
        Err(e) => {
            revoke(auth, session).await;
            Err(e)
        }
    }
}

fn response(
    session: Option<&Session>,
    user_id: Uuid,
    email: Option<String>,
    role: Role,
) -> AuthResponse {
    AuthResponse {
        user_id,
        email,
        role,
        session: session.map(SessionTokens::from),
        business_id: None,
        client_id: None,
    }
}

pub async fn find_admin(
    store: &StoreClient,
    user_id: Uuid,
) -> Result<Option<AdminAccount>, AppError> {
    let query = Query::table(admin::TABLE).eq("user_id", user_id);
    Ok(store.select_one(&query).await?)
}

/// Admin login: the user must hold an admin account.
pub async fn login_admin(
    auth: &AuthClient,
    store: &StoreClient,
    input: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let session = auth
        .sign_in_with_password(&input.email, &input.password)
        .await
        .map_err(sign_in_error)?;
    let scoped = store.as_user(&session.access_token);

    let lookup = find_admin(&scoped, session.user.id).await;
    require_role(auth, &session, lookup, "This account is not an administrator").await?;

    tracing::info!(user_id = %session.user.id, "Admin signed in");
    Ok(response(
        Some(&session),
        session.user.id,
        session.user.email.clone(),
        Role::Admin,
    ))
}

/// Business login: the user must manage a business.
pub async fn login_business(
    auth: &AuthClient,
    store: &StoreClient,
    input: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let session = auth
        .sign_in_with_password(&input.email, &input.password)
        .await
        .map_err(sign_in_error)?;
    let scoped = store.as_user(&session.access_token);

    let lookup = business_service::find_by_admin(&scoped, session.user.id).await;
    let business =
        require_role(auth, &session, lookup, "Only registered businesses can sign in").await?;

    tracing::info!(user_id = %session.user.id, business_id = %business.id, "Business signed in");
    let mut out = response(
        Some(&session),
        session.user.id,
        session.user.email.clone(),
        Role::Business,
    );
    out.business_id = Some(business.id);
    Ok(out)
}

/// Client login: the user must be a client of `business_id`.
pub async fn login_client(
    auth: &AuthClient,
    store: &StoreClient,
    business_id: Uuid,
    input: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let session = auth
        .sign_in_with_password(&input.email, &input.password)
        .await
        .map_err(sign_in_error)?;
    let scoped = store.as_user(&session.access_token);
    let email = session.user.email.as_deref().unwrap_or(&input.email);

    let lookup = client_service::find_by_email(&scoped, business_id, email).await;
    let client =
        require_role(auth, &session, lookup, "No client account for this business").await?;

    let mut out = response(
        Some(&session),
        session.user.id,
        session.user.email.clone(),
        Role::Client,
    );
    out.business_id = Some(business_id);
    out.client_id = Some(client.id);
    Ok(out)
}

/// Admin sign-up. The admin account row is created store-side; the phone is
/// patched onto it afterwards when given.
pub async fn register_admin(
    auth: &AuthClient,
    store: &StoreClient,
    input: &AdminRegistration,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let metadata = serde_json::json!({ "name": input.name, "phone": input.phone });
    let outcome = auth
        .sign_up(&input.email, &input.password, &metadata)
        .await
        .map_err(sign_up_error)?;
    let user = outcome.user();

    if let (Some(phone), Some(session)) = (input.phone.as_deref(), outcome.session()) {
        let scoped = store.as_user(&session.access_token);
        let query = Query::table(admin::TABLE).eq("user_id", user.id);
        if let Err(e) = scoped
            .update::<_, serde_json::Value>(&query, &AdminContact { phone })
            .await
        {
            tracing::warn!(error = %e, user_id = %user.id, "Could not store admin phone");
        }
    }

    tracing::info!(user_id = %user.id, "Admin registered");
    Ok(response(
        outcome.session(),
        user.id,
        user.email.clone(),
        Role::Admin,
    ))
}

fn writer_for(store: &StoreClient, outcome: &SignUpOutcome) -> StoreClient {
    match outcome.session() {
        Some(session) => store.as_user(&session.access_token),
        None => store.clone(),
    }
}

/// Business self-registration: a new auth user owning a new business.
pub async fn register_business(
    auth: &AuthClient,
    store: &StoreClient,
    input: &BusinessRegistration,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let metadata = serde_json::json!({ "name": input.owner_name, "phone": input.phone });
    let outcome = auth
        .sign_up(&input.email, &input.password, &metadata)
        .await
        .map_err(sign_up_error)?;
    let user = outcome.user();

    let business = business_service::create(
        &writer_for(store, &outcome),
        &CreateBusiness {
            name: input.business_name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            city: input.city.clone(),
            admin_id: Some(user.id),
        },
    )
    .await?;

    let mut out = response(
        outcome.session(),
        user.id,
        user.email.clone(),
        Role::Business,
    );
    out.business_id = Some(business.id);
    Ok(out)
}

/// Client sign-up for one business.
pub async fn register_client(
    auth: &AuthClient,
    store: &StoreClient,
    business_id: Uuid,
    input: &ClientRegistration,
) -> Result<AuthResponse, AppError> {
    input.validate()?;
    let metadata = serde_json::json!({ "name": input.name, "phone": input.phone });
    let outcome = auth
        .sign_up(&input.email, &input.password, &metadata)
        .await
        .map_err(sign_up_error)?;
    let user = outcome.user();

    let client: Client = client_service::create(
        &writer_for(store, &outcome),
        business_id,
        &CreateClient {
            name: input.name.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
        },
    )
    .await?;

    let mut out = response(outcome.session(), user.id, user.email.clone(), Role::Client);
    out.business_id = Some(business_id);
    out.client_id = Some(client.id);
    Ok(out)
}

pub async fn refresh(auth: &AuthClient, input: &RefreshRequest) -> Result<SessionTokens, AppError> {
    let session = auth
        .refresh(&input.refresh_token)
        .await
        .map_err(|e| match e.status() {
            Some(400 | 401) => AppError::Unauthorized,
            _ => AppError::Store(e),
        })?;
    Ok(SessionTokens::from(&session))
}

pub async fn logout(auth: &AuthClient, access_token: &str) -> Result<(), AppError> {
    auth.sign_out(access_token).await?;
    Ok(())
}

/// Resolve which roles the user holds.
pub async fn me(store: &StoreClient, user_id: Uuid, email: Option<String>) -> Result<Me, AppError> {
    let (admin, business) = tokio::try_join!(
        find_admin(store, user_id),
        business_service::find_by_admin(store, user_id),
    )?;
    Ok(Me {
        user_id,
        email,
        is_admin: admin.is_some(),
        business,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &str = "test-secret-with-enough-length-for-hs256";

    fn token(aud: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: Some("owner@example.com".to_string()),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            aud: Some(aud.to_string()),
            role: Some("authenticated".to_string()),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_is_accepted() {
        let claims = validate_token(&token(TOKEN_AUDIENCE, 3600), SECRET).unwrap();
        assert_eq!(claims.email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = validate_token(&token(TOKEN_AUDIENCE, -3600), SECRET).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        assert!(validate_token(&token("anon", 3600), SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        assert!(validate_token(&token(TOKEN_AUDIENCE, 3600), "other-secret").is_err());
    }

    #[test]
    fn provider_rejection_means_bad_credentials() {
        let err = sign_in_error(StoreError::Api {
            status: 400,
            code: Some("invalid_credentials".to_string()),
            message: "Invalid login credentials".to_string(),
        });
        assert!(matches!(err, AppError::InvalidCredentials));

        let err = sign_in_error(StoreError::Api {
            status: 503,
            code: None,
            message: "unavailable".to_string(),
        });
        assert!(matches!(err, AppError::Store(_)));
    }

    #[test]
    fn duplicate_sign_up_is_a_conflict() {
        let err = sign_up_error(StoreError::Api {
            status: 422,
            code: Some("user_already_exists".to_string()),
            message: "User already registered".to_string(),
        });
        assert!(matches!(err, AppError::Conflict(_)));

        let err = sign_up_error(StoreError::Api {
            status: 422,
            code: Some("weak_password".to_string()),
            message: "Password should be at least 6 characters".to_string(),
        });
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn login_request_requires_email() {
        let input = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
