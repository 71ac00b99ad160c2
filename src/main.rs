use clap::Parser;
use formfill::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Fill HTML form fields with answers drawn from a PDF corpus
#[derive(Parser, Debug)]
#[command(name = "formfill")]
#[command(about = "Auto-fill form fields from PDF documents with a hosted LLM", long_about = None)]
struct Args {
    /// Address to bind the HTTP API to
    #[arg(long, env = "FORMFILL_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "FORMFILL_PORT", default_value_t = 5055)]
    port: u16,

    /// HTML form whose fields are filled
    #[arg(long, env = "FORMFILL_FORM_PATH", default_value = "templates/styled_tax_form.html")]
    form_path: PathBuf,

    /// Directory of PDF documents answers are drawn from
    #[arg(long, env = "FORMFILL_CORPUS_DIR", default_value = "info")]
    corpus_dir: PathBuf,

    /// Directory served under /static
    #[arg(long, env = "FORMFILL_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Number of fields answered concurrently
    #[arg(long, env = "FORMFILL_FIELD_CONCURRENCY", default_value_t = 1)]
    field_concurrency: usize,

    /// watsonx.ai service URL
    #[arg(long, env = "WATSONX_URL", default_value = DEFAULT_WATSONX_URL)]
    watsonx_url: String,

    /// IBM Cloud API key
    #[arg(long, env = "WATSONX_API_KEY", hide_env_values = true)]
    watsonx_api_key: String,

    /// watsonx.ai project id
    #[arg(long, env = "WATSONX_PROJECT_ID")]
    watsonx_project_id: String,

    /// Generation model
    #[arg(long, env = "WATSONX_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Feature-extraction endpoint for the embedding model
    #[arg(long, env = "EMBEDDING_URL", default_value = DEFAULT_EMBEDDING_URL)]
    embedding_url: String,

    /// Bearer token for the embedding endpoint
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    /// Log level
    #[arg(long, env = "FORMFILL_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting formfill v{}", env!("CARGO_PKG_VERSION"));
    info!("Form: {:?}", args.form_path);
    info!("Corpus directory: {:?}", args.corpus_dir);

    let mut watsonx = WatsonxConfig::new(args.watsonx_api_key, args.watsonx_project_id);
    watsonx.url = args.watsonx_url;
    watsonx.model_id = args.model_id;
    let generator = Arc::new(WatsonxGenerator::new(watsonx)?);
    info!("Generation model: {}", generator.model());

    let embedder = Arc::new(HuggingFaceEmbedder::new(EmbeddingConfig {
        url: args.embedding_url,
        api_token: args.hf_token,
    })?);
    info!("Embedding model: {}", embedder.model());

    let mut settings = PipelineSettings::new(args.form_path, args.corpus_dir);
    settings.field_concurrency = args.field_concurrency;
    let pipeline = Arc::new(FormFillPipeline::new(settings, embedder, generator)?);

    let host = args.host;
    let port = args.port;
    let static_dir = Some(args.static_dir);
    info!("HTTP API: http://{}:{}/api/get_tax_form_data", host, port);

    let http_handle = std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(pipeline, static_dir, host, port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
