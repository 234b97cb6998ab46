use std::sync::Arc;
use std::time::Duration;

use pushkind_jobmatch::clients::EmbeddingProvider;
use pushkind_jobmatch::clients::gemini::GeminiClient;
use pushkind_jobmatch::clients::local::LocalEmbedder;
use pushkind_jobmatch::clients::mailer::HttpMailer;
use pushkind_jobmatch::db::{establish_connection_pool, run_migrations};
use pushkind_jobmatch::models::config::{EmbeddingBackend, ServerConfig};
use pushkind_jobmatch::processing::matching::MatchingEngine;
use pushkind_jobmatch::processing::notification::{MailPacer, NotificationDispatcher};
use pushkind_jobmatch::processing::{AppContext, ZMQMessage, ZMQReply, process_message};
use pushkind_jobmatch::repository::DieselRepository;

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{context}: {e}");
            std::process::exit(1);
        }
    }
}

fn build_embedder(config: &ServerConfig) -> Result<Arc<dyn EmbeddingProvider>, String> {
    let embedding = &config.embedding;
    let embedder: Arc<dyn EmbeddingProvider> = match embedding.provider {
        EmbeddingBackend::Gemini => Arc::new(
            GeminiClient::new(
                &embedding.base_url,
                &embedding.api_key,
                &embedding.model,
                embedding.timeout_secs,
            )
            .map_err(|e| e.to_string())?,
        ),
        EmbeddingBackend::Local => {
            Arc::new(LocalEmbedder::from_model_name(&embedding.model).map_err(|e| e.to_string())?)
        }
    };
    log::info!(
        "Using {:?} embedding provider with model {}",
        embedding.provider,
        embedding.model
    );
    Ok(embedder)
}

fn build_context(config: &ServerConfig) -> Result<AppContext, String> {
    let embedder = build_embedder(config)?;

    let generation = &config.generation;
    let advisor = GeminiClient::new(
        &generation.base_url,
        &generation.api_key,
        &generation.model,
        generation.timeout_secs,
    )
    .map_err(|e| e.to_string())?;

    let mail = &config.mail;
    let mailer = HttpMailer::new(&mail.base_url, &mail.api_key, &mail.from, mail.timeout_secs)
        .map_err(|e| e.to_string())?;
    let pacer = MailPacer::new(Duration::from_millis(mail.interval_ms), mail.burst);

    Ok(AppContext {
        embedder,
        engine: MatchingEngine::new(config.similarity_threshold),
        dispatcher: Arc::new(NotificationDispatcher::new(
            Arc::new(mailer),
            Arc::new(advisor),
            Arc::new(pacer),
        )),
        auth: (&config.auth).into(),
    })
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = exit_on_error(ServerConfig::load(), "Failed to load configuration");

    let pool = exit_on_error(
        establish_connection_pool(&config.database_url),
        "Failed to establish database connection",
    );
    exit_on_error(run_migrations(&pool), "Failed to prepare database schema");
    let repo = DieselRepository::new(pool);

    let ctx = exit_on_error(build_context(&config), "Failed to build providers");

    let context = zmq::Context::new();
    let responder = exit_on_error(context.socket(zmq::REP), "Cannot create zmq socket");
    exit_on_error(
        responder.bind(&config.zmq_address),
        "Cannot bind to zmq address",
    );
    log::info!(
        "Listening on {} with similarity threshold {}",
        config.zmq_address,
        ctx.engine.threshold()
    );

    loop {
        let msg = match responder.recv_bytes(0) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to receive message: {e}");
                continue;
            }
        };

        let reply = match serde_json::from_slice::<ZMQMessage>(&msg) {
            Ok(parsed) => process_message(parsed, repo.clone(), &ctx).await,
            Err(e) => {
                log::error!("Failed to parse JSON: {e}");
                ZMQReply::parse_error(&e)
            }
        };

        let payload = match serde_json::to_vec(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to serialize reply: {e}");
                br#"{"status":"error","kind":"unexpected","message":"reply serialization failed"}"#
                    .to_vec()
            }
        };

        if let Err(e) = responder.send(payload, 0) {
            log::error!("Failed to send reply: {e}");
        }
    }
}
