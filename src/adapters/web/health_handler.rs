use actix_web::{HttpResponse, Responder, get};

#[get("/health")]
pub async fn health() -> impl Responder {
	HttpResponse::Ok().content_type("text/plain").body("ok")
}
