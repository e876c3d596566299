//! End-to-end authorization: identity token → platform user token → session token.

// self
use crate::{
	_prelude::*,
	auth::{IdentityTicket, InteractiveTokenSource},
	flows::Broker,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	xbl::XblAuthorization,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs the whole pipeline starting from the token cache.
	pub async fn xbl_authorization(&self) -> Result<XblAuthorization> {
		self.xbl_authorization_until_cancelled(&CancellationToken::new()).await
	}

	/// Same as [`Broker::xbl_authorization`]; `cancel` aborts a pending device-code login.
	pub async fn xbl_authorization_until_cancelled(
		&self,
		cancel: &CancellationToken,
	) -> Result<XblAuthorization> {
		let acquired = self.acquire_until_cancelled(cancel).await?;

		self.xbl_authorization_from_ticket(&IdentityTicket::from_token_set(&acquired.token_set))
			.await
	}

	/// Runs the platform stages for an identity ticket obtained elsewhere.
	pub async fn xbl_authorization_from_ticket(
		&self,
		ticket: &IdentityTicket,
	) -> Result<XblAuthorization> {
		let user = self.authenticate_user(ticket).await?;
		let session = self.authorize_session(&user).await?;

		tracing::info!(
			user_hash = %session.user_hash,
			relying_party = %self.session_relying_party,
			"session token issued"
		);

		Ok(XblAuthorization::new(session, self.session_relying_party.clone()))
	}

	/// Captures a ticket through `source` (browser login) and runs the platform stages.
	pub async fn xbl_authorization_from_source(
		&self,
		source: &dyn InteractiveTokenSource,
	) -> Result<XblAuthorization> {
		let captured = source.capture().await?;

		self.xbl_authorization_from_ticket(&captured.ticket).await
	}
}
