use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, error, post, web};
use log::debug;
use uuid::Uuid;

use crate::adapters::web::errors::ApiError;
use crate::adapters::web::schema::{PaymentAcceptedResponse, PaymentRequest};
use crate::engine::HttpPaymentEngine;

/// Maps malformed or unknown-field bodies to the API error format.
pub fn json_config() -> web::JsonConfig {
	web::JsonConfig::default().error_handler(
		|err: error::JsonPayloadError, _req: &HttpRequest| {
			debug!("Rejected payment payload: {err}");
			ApiError::BadClientDataError.into()
		},
	)
}

#[post("/payments")]
pub async fn payments(
	payload: web::Json<PaymentRequest>,
	engine: web::Data<HttpPaymentEngine>,
) -> impl Responder {
	match engine.submit(payload.into_inner().into()) {
		Ok(()) => {
			let id = Uuid::new_v4();
			debug!("Payment {id} queued");
			HttpResponse::Accepted().json(PaymentAcceptedResponse {
				id,
				status: "accepted".to_string(),
				message: "Payment queued for processing".to_string(),
			})
		}
		Err(e) => {
			debug!("Payment rejected: {e}");
			ApiError::from(e).error_response()
		}
	}
}
