use actix_web::{post, web, HttpResponse};
use serde::Serialize;

use crate::{configuration::Settings, services::run_extraction};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Runs one extraction to completion and answers with its summary.
#[post("/scrape")]
async fn scrape(settings: web::Data<Settings>) -> HttpResponse {
    match run_extraction(&settings).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("Scrape run failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorBody {
                error: e.to_string(),
            })
        }
    }
}
