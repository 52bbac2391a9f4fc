use std::path::{Path, PathBuf};

use actix_files::NamedFile;
use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse,
};
use serde::Deserialize;

use crate::{
    configuration::Settings,
    routes::scrape_route::ErrorBody,
    services::{latest_structured_file, read_rows},
};

#[derive(Deserialize)]
struct DownloadQuery {
    file: String,
}

#[get("/download")]
async fn download(
    req: HttpRequest,
    settings: web::Data<Settings>,
    query: web::Query<DownloadQuery>,
) -> HttpResponse {
    let Some(path) = resolve_output_file(&settings.output.directory, &query.file) else {
        return HttpResponse::NotFound().body("File not found");
    };

    match NamedFile::open_async(&path).await {
        Ok(file) => {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            file.set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file_name)],
            })
            .into_response(&req)
        }
        Err(e) => {
            log::error!("Failed to open {} for download: {:?}", path.display(), e);
            HttpResponse::NotFound().body("File not found")
        }
    }
}

/// Rows of the most recent structured file as JSON objects keyed by header.
#[get("/api/data")]
async fn latest_data(settings: web::Data<Settings>) -> HttpResponse {
    let latest = match latest_structured_file(&settings.output.directory) {
        Ok(latest) => latest,
        Err(e) => {
            log::error!("Failed to list output directory: {:?}", e);
            None
        }
    };
    let Some(path) = latest else {
        return HttpResponse::NotFound().json(ErrorBody {
            error: "No data available".to_string(),
        });
    };

    match read_rows(&path) {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => {
            log::error!("Failed to read {}: {:?}", path.display(), e);
            HttpResponse::InternalServerError().json(ErrorBody {
                error: e.to_string(),
            })
        }
    }
}

/// Only the file name of `requested` is honoured, so downloads never leave
/// the output directory.
fn resolve_output_file(directory: &Path, requested: &str) -> Option<PathBuf> {
    let file_name = Path::new(requested).file_name()?;
    let path = directory.join(file_name);
    path.is_file().then_some(path)
}
