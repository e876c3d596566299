//! User-token stage: walk the exchange plan until the platform accepts one encoding.

// self
use crate::{
	_prelude::*,
	auth::IdentityTicket,
	error::body_preview,
	flows::Broker,
	http::{self, TokenHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	xbl::{
		CONTRACT_VERSION_HEADER, ExchangeAttempt, ExchangePlan, ExchangeReport, PlatformUserToken,
		encode_candidates, wire::{PlatformTokenResponse, UserAuthenticateRequest},
	},
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an identity ticket for a platform user token.
	///
	/// Attempts run strictly one after another in [`ExchangePlan`] order and stop at the first
	/// HTTP 200. Transport failures abort the search immediately. When every attempt is
	/// rejected the error carries an [`ExchangeReport`] of all of them.
	pub async fn authenticate_user(&self, ticket: &IdentityTicket) -> Result<PlatformUserToken> {
		const KIND: FlowKind = FlowKind::UserToken;

		let span = FlowSpan::new(KIND, "authenticate_user");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let quirks = &self.descriptor.quirks;
				let candidates = encode_candidates(
					ticket.decoded.expose(),
					ticket.raw.as_ref().map(|raw| raw.expose()),
				);
				let plan = ExchangePlan::new(&quirks.user_relying_parties, &candidates);
				let contract = [(CONTRACT_VERSION_HEADER, quirks.contract_version.as_str())];
				let mut report = ExchangeReport::default();

				for attempt in &plan {
					let body = UserAuthenticateRequest::new(
						&quirks.site_name,
						attempt.candidate.value.expose(),
						&attempt.relying_party,
					);
					let headers: &[(&str, &str)] =
						if attempt.contract_header { &contract } else { &[] };
					let request = oauth::json_request(
						&self.descriptor.platform.user_authenticate,
						&body,
						headers,
					)?;

					self.exchange_metrics.record_request();

					let response = http::dispatch(
						self.http_client.as_ref(),
						self.transport_mapper.as_ref(),
						KIND,
						request,
					)
					.await?;

					if response.is_ok() {
						self.exchange_metrics.record_accepted();
						tracing::debug!(attempt = %attempt.label(), "user token accepted");

						let payload: PlatformTokenResponse = oauth::parse_json(KIND, &response)?;

						return payload.into_user_token(KIND);
					}

					self.exchange_metrics.record_rejected();
					tracing::debug!(
						attempt = %attempt.label(),
						status = response.status,
						correlation_id = response.correlation_id.as_deref().unwrap_or("-"),
						"user token attempt rejected"
					);
					report.push(ExchangeAttempt {
						candidate_label: attempt.candidate.label.clone(),
						relying_party: attempt.relying_party.clone(),
						contract_header: attempt.contract_header,
						status: response.status,
						correlation_id: response.correlation_id.clone(),
						body_preview: body_preview(&response.body),
					});
				}

				self.exchange_metrics.record_exhausted();
				tracing::warn!(
					attempts = report.len(),
					digest = %report.digest(),
					"every user token attempt was rejected"
				);

				Err(Error::ExchangeExhausted(report))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
