use derive_more::derive::{Display, Error};
use serde::{Deserialize, Serialize};

pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// A payment accepted for asynchronous processing. This is also the body
/// posted to the upstream processors.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
	pub amount:      i64,
	#[serde(skip_serializing_if = "is_blank", default)]
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub kind:        String,
}

fn is_blank(description: &Option<String>) -> bool {
	description.as_deref().is_none_or(str::is_empty)
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
	#[display("amount must be positive")]
	NonPositiveAmount,
	#[display("type is required")]
	MissingType,
	#[display("description too long")]
	DescriptionTooLong,
}

impl PaymentRequest {
	pub fn validate(&self) -> Result<(), ValidationError> {
		if self.amount <= 0 {
			return Err(ValidationError::NonPositiveAmount);
		}

		if self.kind.is_empty() {
			return Err(ValidationError::MissingType);
		}

		if self
			.description
			.as_deref()
			.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
		{
			return Err(ValidationError::DescriptionTooLong);
		}

		Ok(())
	}
}
