//! Session (XSTS) authorization stage.

// self
use crate::{
	_prelude::*,
	error::body_preview,
	flows::Broker,
	http::{self, TokenHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	xbl::{
		CONTRACT_VERSION_HEADER, PlatformUserToken, SessionToken,
		wire::{PlatformTokenResponse, SessionAuthorizeRequest},
	},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges a platform user token for a session token scoped to
	/// [`Broker::session_relying_party`].
	///
	/// The request is sent once, always with the contract-version header; any non-200 answer is
	/// an [`Error::Authorization`].
	pub async fn authorize_session(&self, user: &PlatformUserToken) -> Result<SessionToken> {
		const KIND: FlowKind = FlowKind::SessionToken;

		let span = FlowSpan::new(KIND, "authorize_session");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let quirks = &self.descriptor.quirks;
				let body = SessionAuthorizeRequest::new(
					&quirks.sandbox_id,
					user.token.expose(),
					&self.session_relying_party,
				);
				let request = oauth::json_request(
					&self.descriptor.platform.session_authorize,
					&body,
					&[(CONTRACT_VERSION_HEADER, quirks.contract_version.as_str())],
				)?;
				let response = http::dispatch(
					self.http_client.as_ref(),
					self.transport_mapper.as_ref(),
					KIND,
					request,
				)
				.await?;

				if !response.is_ok() {
					tracing::debug!(
						status = response.status,
						correlation_id = response.correlation_id.as_deref().unwrap_or("-"),
						"session authorization rejected"
					);

					return Err(Error::Authorization {
						status: response.status,
						body_preview: body_preview(&response.body),
					});
				}

				let payload: PlatformTokenResponse = oauth::parse_json(KIND, &response)?;

				payload.into_session_token(KIND)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
