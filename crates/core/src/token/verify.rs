use serde_json::Value;
use tracing::{info, warn};

use crate::api::{ApiRequest, Endpoint};
use crate::fetcher::{AbortReason, FetchContext, FetchError};
use crate::profile::parse_id;

use super::Identity;

/// Check the credential the context's client sends for `AuthMode::User`.
///
/// A 200 yields the account identity, a 401 or any other failure yields
/// `None`. Rate limits are waited out.
pub async fn verify_token(ctx: &FetchContext) -> Result<Option<Identity>, FetchError> {
    let request = ApiRequest::new(Endpoint::VerifyCredentials)
        .param("include_entities", "false")
        .param("skip_status", "true");

    match ctx.fetch_single(request).await {
        Ok(user) => {
            let identity = parse_id(&user).zip(user.get("screen_name").and_then(Value::as_str));
            match identity {
                Some((user_id, screen_name)) => Ok(Some(Identity {
                    user_id,
                    screen_name: screen_name.to_string(),
                })),
                None => {
                    warn!("Credential check returned no identity");
                    Ok(None)
                }
            }
        }
        Err(FetchError::Aborted(AbortReason::Status(401))) => {
            info!("Token rejected as invalid");
            Ok(None)
        }
        Err(FetchError::Cancelled) => Err(FetchError::Cancelled),
        Err(e) => {
            warn!(error = %e, "Credential check failed");
            Ok(None)
        }
    }
}
