use std::sync::Arc;

use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use library_assist::catalog::{Catalog, MembershipDirectory, OpeningHours};
use library_assist::llm::{self, LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use library_assist::scope::ScopeClassifier;
use library_assist::tools::builtin::{CheckAvailabilityTool, LibraryTimingsTool, SearchBookTool};
use library_assist::tools::tool::Tool;
use library_assist::tools::ToolRegistry;
use library_assist::{AssistantConfig, Dispatcher, Session, UserContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
        eprintln!("GEMINI_API_KEY is not set.");
        eprintln!("Export it before starting the assistant:");
        eprintln!("  export GEMINI_API_KEY=...");
        std::process::exit(1);
    };

    let mut config = AssistantConfig::default();
    if let Ok(raw) = std::env::var("LIBRARY_ASSIST_MAX_TOOL_ROUNDS") {
        config.max_tool_rounds = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("LIBRARY_ASSIST_MAX_TOOL_ROUNDS must be a number, got {raw:?}"))?;
    }

    let llm_config = LlmConfig {
        api_key: SecretString::from(api_key),
        base_url: std::env::var("LIBRARY_ASSIST_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        model: std::env::var("LIBRARY_ASSIST_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        request_timeout: config.request_timeout,
    };
    let provider = llm::create_provider(&llm_config)?;

    let catalog = Arc::new(Catalog::seeded());
    let members = Arc::new(MembershipDirectory::seeded());
    let hours = Arc::new(OpeningHours::seeded());

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(SearchBookTool::new(Arc::clone(&catalog))),
        Arc::new(CheckAvailabilityTool::new(catalog, members)),
        Arc::new(LibraryTimingsTool::new(hours)),
    ];
    let registry = Arc::new(ToolRegistry::build(tools)?);

    let classifier = ScopeClassifier::new(provider.clone(), &config.classifier_instructions);

    let display_name = std::env::var("LIBRARY_ASSIST_USER").unwrap_or_else(|_| "Guest".to_string());
    let member_id = std::env::var("LIBRARY_ASSIST_MEMBER_ID").ok();
    let ctx = UserContext::new(display_name, member_id);

    eprintln!("📚 {} ready (model: {})", config.name, llm_config.model);
    eprintln!("   User: {} {}", ctx.display_name, match &ctx.member_id {
        Some(id) => format!("(member {id})"),
        None => "(guest)".to_string(),
    });
    eprintln!("   Tools: {} registered", registry.len());
    eprintln!("   /quit to exit");
    eprintln!();

    let dispatcher = Arc::new(Dispatcher::new(config, provider, classifier, registry));
    Session::new(ctx, dispatcher).run().await?;

    Ok(())
}
