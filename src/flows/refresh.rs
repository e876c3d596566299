//! Refresh-token renewal.
//!
//! [`Broker::refresh`] performs exactly one `grant_type=refresh_token` request. A rejection is
//! terminal and is surfaced with the provider payload; callers decide whether to fall back to
//! an interactive login. The request always asks for the descriptor's minimal scope, whatever
//! scope the cached set ended up with. Fields the provider omits (rotated refresh token, id
//! token, scope, token type) carry over from the set being renewed.

// self
use crate::{
	_prelude::*,
	auth::TokenSet,
	error::ConfigError,
	flows::Broker,
	http::{self, TokenHttpClient},
	oauth::{self, TokenResponse, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::GrantType,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Renews `current` with its refresh token and persists the new set.
	pub async fn refresh(&self, current: &TokenSet) -> Result<TokenSet> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let refresh_token =
					current.usable_refresh_token().ok_or(ConfigError::MissingRefreshToken)?;
				let scope = &self.descriptor.quirks.scope;
				let mut form = BTreeMap::from([
					("client_id".to_owned(), self.client_id.clone()),
					("grant_type".to_owned(), GrantType::RefreshToken.wire_value().to_owned()),
					("refresh_token".to_owned(), refresh_token.expose().to_owned()),
					("scope".to_owned(), scope.clone()),
				]);

				self.strategy.augment_token_request(GrantType::RefreshToken, &mut form);

				let request = oauth::form_request(&self.descriptor.identity.token, &form)?;
				let response = http::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					KIND,
					request,
				)
				.await?;

				if !response.is_ok() {
					return Err(oauth::provider_error(
						self.strategy.as_ref(),
						GrantType::RefreshToken,
						&response,
					)
					.into());
				}

				let payload: TokenResponse = oauth::parse_json(KIND, &response)?;
				let renewed = payload.into_token_set(self.clock.now(), Some(current), scope)?;

				self.cache.save(renewed.clone()).await?;

				Ok(renewed)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
