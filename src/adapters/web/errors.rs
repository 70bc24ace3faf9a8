use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, error};
use derive_more::derive::{Display, Error};
use serde::Serialize;

use crate::domain::payment::ValidationError;
use crate::use_cases::create_payment::SubmitError;

#[derive(Serialize)]
struct ErrorResponse {
	#[serde(rename = "statusCode")]
	status_code: u16,
	error:       String,
	message:     String,
}

#[derive(Debug, Display, Error)]
pub enum ApiError {
	#[display("Invalid JSON")]
	BadClientDataError,
	#[display("{_0}")]
	InvalidPayment(ValidationError),
	#[display("Service temporarily unavailable")]
	QueueFull,
	#[display("Service is shutting down")]
	ShuttingDown,
}

impl ApiError {
	pub fn name(&self) -> String {
		match self {
			ApiError::BadClientDataError | ApiError::InvalidPayment(_) => {
				"Bad request".to_string()
			}
			ApiError::QueueFull | ApiError::ShuttingDown => {
				"Service Unavailable".to_string()
			}
		}
	}
}

impl error::ResponseError for ApiError {
	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code())
			.content_type(ContentType::json())
			.json(ErrorResponse {
				status_code: self.status_code().as_u16(),
				error:       self.to_string(),
				message:     self.name(),
			})
	}

	fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadClientDataError | ApiError::InvalidPayment(_) => {
				StatusCode::BAD_REQUEST
			}
			ApiError::QueueFull | ApiError::ShuttingDown => {
				StatusCode::SERVICE_UNAVAILABLE
			}
		}
	}
}

impl From<SubmitError> for ApiError {
	fn from(err: SubmitError) -> Self {
		match err {
			SubmitError::Validation(e) => ApiError::InvalidPayment(e),
			SubmitError::QueueFull => ApiError::QueueFull,
			SubmitError::ShuttingDown => ApiError::ShuttingDown,
		}
	}
}
