use actix_web::{HttpResponse, Responder};

pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
