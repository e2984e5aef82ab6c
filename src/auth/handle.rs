//! Interaction handle newtype shared by the interact and introspect calls.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const HANDLE_MAX_LEN: usize = 2048;

/// Error returned when interaction handle validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum HandleError {
	/// The handle was empty.
	#[error("Interaction handle cannot be empty.")]
	Empty,
	/// The handle contains whitespace characters.
	#[error("Interaction handle contains whitespace.")]
	ContainsWhitespace,
	/// The handle exceeded the allowed length.
	#[error("Interaction handle exceeds {max} bytes.")]
	TooLong {
		/// Maximum permitted byte length.
		max: usize,
	},
}

/// Opaque token identifying one in-progress authentication interaction.
///
/// Handles are short-lived bearer material, so [`Debug`] and [`Display`] never print the value;
/// use [`InteractionHandle::expose`] when the raw string is needed on the wire.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InteractionHandle(String);
impl InteractionHandle {
	/// Creates a new handle after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, HandleError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the raw handle. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Deref for InteractionHandle {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl From<InteractionHandle> for String {
	fn from(value: InteractionHandle) -> Self {
		value.0
	}
}
impl TryFrom<String> for InteractionHandle {
	type Error = HandleError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for InteractionHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("InteractionHandle").field(&"<redacted>").finish()
	}
}
impl Display for InteractionHandle {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
impl FromStr for InteractionHandle {
	type Err = HandleError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), HandleError> {
	if view.is_empty() {
		return Err(HandleError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(HandleError::ContainsWhitespace);
	}
	if view.len() > HANDLE_MAX_LEN {
		return Err(HandleError::TooLong { max: HANDLE_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn handles_validate_and_redact() {
		let handle = InteractionHandle::new("h1").expect("Handle fixture should be valid.");

		assert_eq!(handle.expose(), "h1");
		assert_eq!(format!("{handle:?}"), "InteractionHandle(\"<redacted>\")");
		assert_eq!(format!("{handle}"), "<redacted>");
		assert_eq!(InteractionHandle::new(""), Err(HandleError::Empty));
		assert_eq!(InteractionHandle::new("h 1"), Err(HandleError::ContainsWhitespace));
		assert!(InteractionHandle::new("a".repeat(HANDLE_MAX_LEN + 1)).is_err());
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let handle: InteractionHandle =
			serde_json::from_str("\"h2\"").expect("Handle should deserialize successfully.");

		assert_eq!(handle.expose(), "h2");
		assert!(serde_json::from_str::<InteractionHandle>("\"\"").is_err());
	}
}
