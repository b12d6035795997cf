//! Locale-aware ordering for user-facing labels.
//!
//! Labels compare first by a folded key (canonical decomposition, combining marks dropped,
//! lowercased), so "Ávila" sorts next to "avila" instead of after "zona". Ties on the folded key
//! fall back to the raw string to keep the order total.

use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

pub fn fold(label: &str) -> String {
	label.nfd().filter(|ch| !is_combining_mark(*ch)).flat_map(char::to_lowercase).collect()
}

pub fn compare(a: &str, b: &str) -> Ordering {
	fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// Trims labels, drops empty ones and duplicates, and sorts the rest with [`compare`].
pub fn sorted_labels<I, S>(labels: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut out = labels
		.into_iter()
		.map(|label| label.as_ref().trim().to_string())
		.filter(|label| !label.is_empty())
		.collect::<Vec<_>>();

	out.sort_by(|a, b| compare(a, b));
	out.dedup();

	out
}
