//! Device-code grant driven as an explicit state machine.
//!
//! [`Broker::device_code_login`] requests a device code, hands the instructions to the
//! configured [`DevicePrompt`](crate::auth::DevicePrompt), and polls the token endpoint on the
//! injected [`Sleeper`](crate::clock::Sleeper) until the provider authorizes, denies, or the
//! code expires. Only the `Authorized` transition writes to the token cache.

// self
use crate::{
	_prelude::*,
	auth::{DeviceAuthorization, TokenSecret, TokenSet},
	error::ProviderError,
	flows::{Broker, until_cancelled},
	http::{self, TokenHttpClient},
	oauth::{self, DeviceCodeResponse, TokenResponse, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::{GrantType, ProviderErrorKind},
};

/// Lifetime assumed when the provider omits `expires_in` from the device authorization.
pub const DEFAULT_DEVICE_CODE_LIFETIME: Duration = Duration::seconds(900);

/// States of one device-code login.
///
/// `Requested` moves to `Pending` once a code is issued; `Pending` loops on itself until it
/// reaches one of the terminal states.
#[derive(Clone, Debug)]
pub enum DeviceFlowState {
	/// No device code has been issued yet.
	Requested,
	/// Waiting for the user to finish signing in.
	Pending(DeviceAuthorization),
	/// Provider issued a token set.
	Authorized(TokenSet),
	/// Provider terminally rejected the login.
	Denied(ProviderError),
	/// The device code outlived its window.
	Expired,
}

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs an interactive device-code login and persists the resulting token set.
	pub async fn device_code_login(&self) -> Result<TokenSet> {
		self.device_code_login_until_cancelled(&CancellationToken::new()).await
	}

	/// Same as [`Broker::device_code_login`], aborting with [`Error::Cancelled`] once `cancel`
	/// fires. A cancelled login never touches the cache.
	pub async fn device_code_login_until_cancelled(
		&self,
		cancel: &CancellationToken,
	) -> Result<TokenSet> {
		const KIND: FlowKind = FlowKind::DeviceCode;

		let span = FlowSpan::new(KIND, "device_code_login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut state = DeviceFlowState::Requested;

				loop {
					state = match state {
						DeviceFlowState::Requested => {
							let authorization =
								until_cancelled(cancel, self.request_device_authorization()).await?;

							self.prompt.show(&authorization);

							DeviceFlowState::Pending(authorization)
						},
						DeviceFlowState::Pending(authorization) =>
							self.poll_device_authorization(authorization, cancel).await?,
						DeviceFlowState::Authorized(set) => {
							self.cache.save(set.clone()).await?;

							return Ok(set);
						},
						DeviceFlowState::Denied(error) => return Err(error.into()),
						DeviceFlowState::Expired => return Err(Error::DeviceCodeExpired),
					};
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(err) => {
				tracing::debug!(error = %err, "device code login failed");
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	/// Issues the device authorization request (the `Requested` state).
	pub async fn request_device_authorization(&self) -> Result<DeviceAuthorization> {
		const KIND: FlowKind = FlowKind::DeviceCode;

		let mut form = BTreeMap::from([
			("client_id".to_owned(), self.client_id.clone()),
			("scope".to_owned(), self.descriptor.quirks.scope.clone()),
		]);

		self.strategy.augment_token_request(GrantType::DeviceCode, &mut form);

		let request = oauth::form_request(&self.descriptor.identity.device_authorization, &form)?;
		let response = http::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			KIND,
			request,
		)
		.await?;

		if !response.is_ok() {
			return Err(
				oauth::provider_error(self.strategy.as_ref(), GrantType::DeviceCode, &response)
					.into(),
			);
		}

		let payload: DeviceCodeResponse = oauth::parse_json(KIND, &response)?;
		let interval = payload
			.interval
			.filter(|secs| *secs > 0)
			.map(Duration::seconds)
			.unwrap_or(DeviceAuthorization::DEFAULT_INTERVAL);
		let lifetime = payload
			.expires_in
			.map(|secs| Duration::seconds(secs.max(0)))
			.unwrap_or(DEFAULT_DEVICE_CODE_LIFETIME);
		let message = payload.message.filter(|message| !message.trim().is_empty());

		tracing::debug!(
			interval = interval.whole_seconds(),
			expires_in = lifetime.whole_seconds(),
			"device code issued"
		);

		Ok(DeviceAuthorization {
			device_code: TokenSecret::new(payload.device_code),
			user_code: payload.user_code,
			verification_uri: payload.verification_uri,
			message,
			interval,
			expires_at: self.clock.now() + lifetime,
		})
	}

	/// One step of the `Pending` state: wait `interval`, poll, and classify the answer.
	async fn poll_device_authorization(
		&self,
		mut authorization: DeviceAuthorization,
		cancel: &CancellationToken,
	) -> Result<DeviceFlowState> {
		const KIND: FlowKind = FlowKind::DeviceCode;

		if authorization.is_expired_at(self.clock.now()) {
			return Ok(DeviceFlowState::Expired);
		}

		let interval = authorization.interval;

		until_cancelled(cancel, async {
			self.sleeper.sleep(interval).await;

			Ok(())
		})
		.await?;

		if authorization.is_expired_at(self.clock.now()) {
			return Ok(DeviceFlowState::Expired);
		}

		let mut form = BTreeMap::from([
			("grant_type".to_owned(), GrantType::DeviceCode.wire_value().to_owned()),
			("client_id".to_owned(), self.client_id.clone()),
			("device_code".to_owned(), authorization.device_code.expose().to_owned()),
		]);

		self.strategy.augment_token_request(GrantType::DeviceCode, &mut form);

		let request = oauth::form_request(&self.descriptor.identity.token, &form)?;
		let response = until_cancelled(
			cancel,
			http::dispatch(self.http_client.as_ref(), self.transport_mapper.as_ref(), KIND, request),
		)
		.await?;

		if response.is_ok() {
			let payload: TokenResponse = oauth::parse_json(KIND, &response)?;
			let set =
				payload.into_token_set(self.clock.now(), None, &self.descriptor.quirks.scope)?;

			return Ok(DeviceFlowState::Authorized(set));
		}

		let error = oauth::provider_error(self.strategy.as_ref(), GrantType::DeviceCode, &response);

		tracing::debug!(status = error.status, error = %error.error, "device code poll answered");

		if !error.kind.is_pending() {
			return Ok(DeviceFlowState::Denied(error));
		}
		if error.kind == ProviderErrorKind::SlowDown {
			authorization.slow_down();
		}

		Ok(DeviceFlowState::Pending(authorization))
	}
}
