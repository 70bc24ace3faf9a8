use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::PaymentRequest as Payment;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct PaymentRequest {
	pub amount:      i64,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub description: Option<String>,
	#[serde(rename = "type")]
	pub kind:        String,
}

impl From<PaymentRequest> for Payment {
	fn from(request: PaymentRequest) -> Self {
		Payment {
			amount:      request.amount,
			description: request.description,
			kind:        request.kind,
		}
	}
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentAcceptedResponse {
	pub id:      Uuid,
	pub status:  String,
	pub message: String,
}
