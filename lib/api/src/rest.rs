use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, ResponseError, Result as ActixResult};
use formfill_core::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use crate::FormFillPipeline;

pub struct RestApi;

impl RestApi {
    pub async fn start(
        pipeline: Arc<FormFillPipeline>,
        static_dir: Option<PathBuf>,
        host: String,
        port: u16,
    ) -> std::io::Result<()> {
        HttpServer::new(move || {
            let pipeline = pipeline.clone();
            let static_dir = static_dir.clone();
            App::new()
                .wrap(cors())
                .configure(move |cfg| configure(cfg, pipeline, static_dir))
        })
        .bind((host.as_str(), port))?
        .run()
        .await
    }
}

/// Requests from any origin are allowed.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Register the routes. Static assets are served only if `static_dir` exists.
pub fn configure(
    cfg: &mut web::ServiceConfig,
    pipeline: Arc<FormFillPipeline>,
    static_dir: Option<PathBuf>,
) {
    cfg.app_data(web::Data::new(pipeline))
        .route("/api/get_tax_form_data", web::get().to(get_tax_form_data))
        .route("/", web::get().to(form_page));

    if let Some(dir) = static_dir.filter(|dir| dir.is_dir()) {
        cfg.service(Files::new("/static", dir));
    }
}

/// Pipeline failure, reported as a 500 with a JSON body
#[derive(Debug)]
pub struct ApiError(pub Error);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(serde_json::json!({
            "error": self.0.to_string()
        }))
    }
}

async fn get_tax_form_data(
    pipeline: web::Data<Arc<FormFillPipeline>>,
) -> Result<HttpResponse, ApiError> {
    let form = pipeline.run().await.map_err(|e| {
        error!("Form fill failed: {}", e);
        ApiError(e)
    })?;
    Ok(HttpResponse::Ok().json(form))
}

async fn form_page(pipeline: web::Data<Arc<FormFillPipeline>>) -> ActixResult<NamedFile> {
    Ok(NamedFile::open(&pipeline.settings().form_path)?)
}
