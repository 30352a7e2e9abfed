use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use parley::application::ports::{Diagnostics, HistoryStore, LlmClient};
use parley::application::services::ConversationService;
use parley::domain::ConversationId;
use parley::infrastructure::llm::create_llm_client;
use parley::infrastructure::observability::{TracingConfig, TracingDiagnostics, init_tracing};
use parley::infrastructure::persistence::{InMemoryHistoryStore, PgHistoryStore, create_pool};
use parley::presentation::{Environment, Settings};

const QUICK_PREFIX: &str = "/quick ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment)?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.enable_json,
        &settings.logging.level,
    ))?;

    let assistant_config = settings.assistant_config()?;
    let llm_client = Arc::new(create_llm_client(&settings.llm)?);
    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics::new());

    let conversation_id = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<i64>())
        .transpose()?
        .map(ConversationId::new)
        .unwrap_or(ConversationId::new(0));

    tracing::info!(
        environment = %environment,
        conversation_id = %conversation_id,
        provider = %settings.llm.provider,
        "Assistant starting"
    );

    match &settings.database.url {
        Some(url) => {
            let pool = create_pool(url, &settings.database).await?;
            let store = PgHistoryStore::with_table(pool, settings.database.table_name.clone())?;
            store.ensure_schema().await?;

            let service = ConversationService::new(
                llm_client,
                Arc::new(store),
                diagnostics,
                assistant_config,
            );
            run(Arc::new(service), conversation_id).await
        }
        None => {
            tracing::warn!("No database configured, conversation history is kept in memory");
            let service = ConversationService::new(
                llm_client,
                Arc::new(InMemoryHistoryStore::new()),
                diagnostics,
                assistant_config,
            );
            run(Arc::new(service), conversation_id).await
        }
    }
}

/// Answers each stdin line as one prompt. Lines starting with `/quick `
/// bypass history.
async fn run<L, H>(
    service: Arc<ConversationService<L, H>>,
    conversation_id: ConversationId,
) -> anyhow::Result<()>
where
    L: LlmClient + 'static,
    H: HistoryStore + 'static,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        let reply = match prompt.strip_prefix(QUICK_PREFIX) {
            Some(question) => service.quick_answer(question).await,
            None => {
                service
                    .answer_async(vec![prompt.to_string()], conversation_id)
                    .await?
            }
        };

        println!("{reply}");
    }

    tracing::info!("Input closed, shutting down");
    Ok(())
}
