//! Ordered attempt list for the user-token exchange.

// self
use crate::{_prelude::*, xbl::CandidateTicket};

/// One request the user-token exchange may issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptDescriptor {
	/// Relying party placed in the request body.
	pub relying_party: String,
	/// Whether the contract-version header is sent.
	pub contract_header: bool,
	/// Ticket encoding placed in `RpsTicket`.
	pub candidate: CandidateTicket,
}
impl AttemptDescriptor {
	/// Diagnostic label, e.g. `XBL(d=decoded,rp=http://auth.xboxlive.com,contract=true)`.
	pub fn label(&self) -> String {
		attempt_label(&self.candidate.label, &self.relying_party, self.contract_header)
	}
}

/// Fully materialized exchange order: relying party, then header variant (with the header
/// first), then candidate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangePlan {
	attempts: Vec<AttemptDescriptor>,
}
impl ExchangePlan {
	/// Builds the plan for the given relying parties and candidates.
	pub fn new(relying_parties: &[String], candidates: &[CandidateTicket]) -> Self {
		let attempts = relying_parties
			.iter()
			.flat_map(|relying_party| {
				[true, false].into_iter().flat_map(move |contract_header| {
					candidates.iter().map(move |candidate| AttemptDescriptor {
						relying_party: relying_party.clone(),
						contract_header,
						candidate: candidate.clone(),
					})
				})
			})
			.collect();

		Self { attempts }
	}

	/// Number of planned attempts.
	pub fn len(&self) -> usize {
		self.attempts.len()
	}

	/// Returns `true` when nothing can be attempted.
	pub fn is_empty(&self) -> bool {
		self.attempts.is_empty()
	}

	/// Attempts in execution order.
	pub fn iter(&self) -> std::slice::Iter<'_, AttemptDescriptor> {
		self.attempts.iter()
	}
}
impl<'a> IntoIterator for &'a ExchangePlan {
	type IntoIter = std::slice::Iter<'a, AttemptDescriptor>;
	type Item = &'a AttemptDescriptor;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

pub(crate) fn attempt_label(candidate: &str, relying_party: &str, contract_header: bool) -> String {
	format!("XBL({candidate},rp={relying_party},contract={contract_header})")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::xbl::encode_candidates;

	#[test]
	fn plan_orders_relying_party_then_header_then_candidate() {
		let relying_parties =
			vec!["http://auth.xboxlive.com".to_owned(), "https://auth.xboxlive.com".to_owned()];
		let plan = ExchangePlan::new(&relying_parties, &encode_candidates("abc", None));
		let labels: Vec<_> = plan.iter().map(AttemptDescriptor::label).collect();

		assert_eq!(plan.len(), 12);
		assert_eq!(labels[0], "XBL(decoded,rp=http://auth.xboxlive.com,contract=true)");
		assert_eq!(labels[3], "XBL(decoded,rp=http://auth.xboxlive.com,contract=false)");
		assert_eq!(labels[6], "XBL(decoded,rp=https://auth.xboxlive.com,contract=true)");
		assert_eq!(labels[11], "XBL(t=decoded,rp=https://auth.xboxlive.com,contract=false)");
	}

	#[test]
	fn empty_inputs_produce_empty_plan() {
		assert!(ExchangePlan::new(&[], &encode_candidates("abc", None)).is_empty());
		assert!(ExchangePlan::new(&["rp".to_owned()], &[]).is_empty());
	}
}
