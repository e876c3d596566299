//! Deterministic enumeration of user-token ticket encodings.

// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, percent_decode},
};

/// One labeled wire encoding of the identity bearer.
#[derive(Clone, PartialEq, Eq)]
pub struct CandidateTicket {
	/// Stable label naming the transformation (e.g. `d=rawfrag_enc`).
	pub label: String,
	/// Encoded ticket value.
	pub value: TokenSecret,
}
impl Debug for CandidateTicket {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CandidateTicket")
			.field("label", &self.label)
			.field("fingerprint", &self.value.fingerprint())
			.finish()
	}
}

/// Enumerates candidate ticket encodings in priority order.
///
/// Bases are the decoded token, the raw token (defaults to the decoded one), the raw token
/// percent-decoded, then the fully percent-encoded form of each of those three. Every base is
/// then repeated with a `d=` and a `t=` prefix. Empty values are skipped and duplicate values
/// keep their first position, so the output depends only on the inputs.
pub fn encode_candidates(decoded: &str, raw: Option<&str>) -> Vec<CandidateTicket> {
	let raw = raw.unwrap_or(decoded);
	let raw_decoded = percent_decode(raw);
	let plain = [("decoded", decoded.to_owned()), ("rawfrag", raw.to_owned()), (
		"rawfrag_decoded",
		raw_decoded,
	)];
	let encoded = plain.clone().map(|(label, value)| {
		(format!("{label}_enc"), urlencoding::encode(&value).into_owned())
	});
	let bases: Vec<(String, String)> = plain
		.into_iter()
		.map(|(label, value)| (label.to_owned(), value))
		.chain(encoded)
		.filter(|(_, value)| !value.is_empty())
		.collect();
	let prefixed = bases.iter().flat_map(|(label, value)| {
		["d=", "t="].map(|prefix| (format!("{prefix}{label}"), format!("{prefix}{value}")))
	});
	let mut seen = std::collections::HashSet::new();

	bases
		.iter()
		.cloned()
		.chain(prefixed)
		.filter(|(_, value)| seen.insert(value.clone()))
		.map(|(label, value)| CandidateTicket { label, value: TokenSecret::new(value) })
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn labels(candidates: &[CandidateTicket]) -> Vec<&str> {
		candidates.iter().map(|candidate| candidate.label.as_str()).collect()
	}

	#[test]
	fn plain_token_collapses_to_three_candidates() {
		let candidates = encode_candidates("abc", None);

		assert_eq!(labels(&candidates), ["decoded", "d=decoded", "t=decoded"]);
		assert_eq!(candidates[1].value.expose(), "d=abc");
	}

	#[test]
	fn escaped_raw_form_yields_distinct_encodings() {
		let candidates = encode_candidates("EwA/b+c=", Some("EwA%2Fb%2Bc%3D"));
		let values: Vec<_> = candidates.iter().map(|c| c.value.expose()).collect();

		assert_eq!(labels(&candidates), [
			"decoded",
			"rawfrag",
			"rawfrag_enc",
			"d=decoded",
			"t=decoded",
			"d=rawfrag",
			"t=rawfrag",
			"d=rawfrag_enc",
			"t=rawfrag_enc",
		]);
		assert_eq!(values[2], "EwA%252Fb%252Bc%253D");
		assert_eq!(values[5], "d=EwA%2Fb%2Bc%3D");
	}

	#[test]
	fn plus_is_never_treated_as_space() {
		let candidates = encode_candidates("a+b", Some("a+b"));

		assert_eq!(candidates[0].value.expose(), "a+b");
		assert!(candidates.iter().any(|c| c.label == "decoded_enc" && c.value.expose() == "a%2Bb"));
		assert!(candidates.iter().all(|c| !c.value.expose().contains(' ')));
	}

	#[test]
	fn output_is_deterministic_and_unique() {
		let first = encode_candidates("x/y", Some("x%2Fy%25"));
		let second = encode_candidates("x/y", Some("x%2Fy%25"));
		let mut values: Vec<_> = first.iter().map(|c| c.value.expose().to_owned()).collect();

		assert_eq!(first, second);

		let total = values.len();

		values.sort();
		values.dedup();

		assert_eq!(values.len(), total);
	}

	#[test]
	fn empty_token_produces_no_candidates() {
		assert!(encode_candidates("", None).is_empty());
	}
}
