use actix_web::{HttpResponse, Responder, get, web};

use crate::engine::HttpPaymentEngine;

#[get("/payments-summary")]
pub async fn payments_summary(engine: web::Data<HttpPaymentEngine>) -> impl Responder {
	HttpResponse::Ok().json(engine.get_summary())
}
