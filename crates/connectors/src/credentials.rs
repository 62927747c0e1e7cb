//! Credential resolution for a store endpoint: named profile + region,
//! optionally exchanged for temporary role credentials through STS, with
//! an interactive MFA step when the role demands one. The copy engine
//! never sees any of this; it receives ready-made clients.

use crate::error::CredentialError;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_sts::error::ProvideErrorMetadata;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::info;

/// Zero-argument supplier of a one-time MFA code, invoked at most once
/// per role assumption.
pub type MfaCodeSupplier = Arc<dyn Fn() -> String + Send + Sync>;

/// Role to assume on top of the base profile credentials.
#[derive(Debug, Clone)]
pub struct RoleDescriptor {
    pub role_arn: String,
    pub session_name: String,
    pub mfa_serial: Option<String>,
}

/// Everything needed to produce a short-lived client configuration for
/// one store endpoint.
#[derive(Clone)]
pub struct CredentialContext {
    pub profile: String,
    pub region: String,
    pub role: Option<RoleDescriptor>,
    pub mfa_code: Option<MfaCodeSupplier>,
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("role", &self.role)
            .field(
                "mfa_code",
                &self.mfa_code.as_ref().map(|_| "<supplier>"),
            )
            .finish()
    }
}

/// Resolves the context into an SDK configuration. Without a role this is
/// the profile's own credentials; with one, the profile credentials are
/// exchanged for temporary role credentials first.
pub async fn resolve(ctx: &CredentialContext) -> Result<SdkConfig, CredentialError> {
    let base = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(&ctx.profile)
        .region(Region::new(ctx.region.clone()))
        .load()
        .await;

    let Some(role) = &ctx.role else {
        return Ok(base);
    };

    let credentials = assume_role(&base, role, ctx.mfa_code.as_ref()).await?;

    Ok(aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(ctx.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await)
}

async fn assume_role(
    base: &SdkConfig,
    role: &RoleDescriptor,
    mfa_code: Option<&MfaCodeSupplier>,
) -> Result<Credentials, CredentialError> {
    let sts = aws_sdk_sts::Client::new(base);

    let mut request = sts
        .assume_role()
        .role_arn(&role.role_arn)
        .role_session_name(&role.session_name);

    if let Some((serial, code)) = mfa_token(role, mfa_code)? {
        request = request.serial_number(serial).token_code(code);
    }

    let response = request.send().await.map_err(|err| {
        let message = err
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        CredentialError::AssumeRole {
            role_arn: role.role_arn.clone(),
            message,
        }
    })?;

    // A successful exchange with no credential payload must not be
    // carried forward as undefined credentials.
    let payload = response.credentials.ok_or(CredentialError::EmptyCredentials)?;
    let expiry = SystemTime::try_from(payload.expiration).ok();

    info!(
        role_arn = %role.role_arn,
        session = %role.session_name,
        "Assumed role"
    );

    Ok(Credentials::new(
        payload.access_key_id,
        payload.secret_access_key,
        Some(payload.session_token),
        expiry,
        "AssumeRole",
    ))
}

/// Produces the (serial, code) pair for the request when the role has an
/// MFA serial configured; requires a supplier in that case.
fn mfa_token(
    role: &RoleDescriptor,
    supplier: Option<&MfaCodeSupplier>,
) -> Result<Option<(String, String)>, CredentialError> {
    match &role.mfa_serial {
        None => Ok(None),
        Some(serial) => {
            let supplier =
                supplier.ok_or_else(|| CredentialError::MfaCodeRequired(role.role_arn.clone()))?;
            Ok(Some((serial.clone(), supplier())))
        }
    }
}
