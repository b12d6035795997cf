use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static EMAIL_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

pub fn is_plausible_email(value: &str) -> bool {
	EMAIL_RE.as_ref().map(|re| re.is_match(value)).unwrap_or(false)
}

/// Picks the email to bind a federated identity to.
///
/// The first entry of `emails` flagged `primary` wins. When the list yields nothing (absent, not a
/// list, malformed entries, no primary flag), the profile's public `email` is used.
pub fn resolve_provider_email(profile: &Value, emails: &Value) -> Option<String> {
	primary_email(emails).or_else(|| public_email(profile))
}

/// Display name offered by the provider: the profile `name`, else the account handle.
pub fn provider_display_name(profile: &Value) -> Option<String> {
	["name", "login"].into_iter().find_map(|key| {
		profile.get(key).and_then(Value::as_str).map(str::trim).filter(|value| !value.is_empty())
	})
	.map(str::to_string)
}

fn primary_email(emails: &Value) -> Option<String> {
	emails.as_array()?.iter().find_map(|entry| {
		if !entry.get("primary").and_then(Value::as_bool).unwrap_or(false) {
			return None;
		}

		usable(entry.get("email"))
	})
}

fn public_email(profile: &Value) -> Option<String> {
	usable(profile.get("email"))
}

fn usable(value: Option<&Value>) -> Option<String> {
	value
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|email| is_plausible_email(email))
		.map(str::to_string)
}
