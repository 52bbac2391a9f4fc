use actix_web::{get, web, HttpResponse};
use askama::Template;

use crate::configuration::Settings;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    target_url: String,
}

#[get("/")]
async fn default(settings: web::Data<Settings>) -> HttpResponse {
    let template = IndexTemplate {
        target_url: settings.scrape.target_url.clone(),
    };

    match template.render() {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(e) => {
            log::error!("Failed to render index page: {:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
