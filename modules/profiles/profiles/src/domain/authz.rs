//! Decides whether a bearer of an access token may act on an account.

use profiles_sdk::AccountId;

use crate::domain::error::DomainError;
use crate::domain::ports::AccessTokenDecoder;
use crate::domain::repo::AccountsRepository;

/// Returns the actor id when the token is valid and the actor either owns
/// `user_id` or belongs to an elevated group.
///
/// # Errors
/// [`DomainError::Unauthorized`] for a rejected token, [`DomainError::Forbidden`]
/// when the actor has no rights over `user_id`.
pub async fn authorize_profile_edit(
    tokens: &dyn AccessTokenDecoder,
    accounts: &dyn AccountsRepository,
    token: &str,
    user_id: AccountId,
) -> Result<AccountId, DomainError> {
    let claims = tokens.decode_access_token(token)?;
    let actor_id = claims.user_id;

    if actor_id == user_id {
        return Ok(actor_id);
    }

    match accounts.find_group(actor_id).await? {
        Some(group) if group.is_elevated() => {
            tracing::debug!(actor_id, user_id, %group, "elevated actor acting on foreign account");
            Ok(actor_id)
        }
        _ => Err(DomainError::forbidden()),
    }
}
