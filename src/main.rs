use anyhow::{Context, bail};
use deepsearch::{
    DeepSearchConfig, Provider, ResearchCoordinator, SearchEngineRegistry,
    cli::{Cli, output::Output},
};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    // Credentials may live in .env; load it before anything reads the environment
    dotenvy::dotenv().ok();

    let mut config = DeepSearchConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(&cli, &config);

    let registry = SearchEngineRegistry::with_builtin_engines();

    if cli.list_engines {
        output.header("Search engines");
        for info in registry.list(&config.search) {
            output.engine(&info);
        }
        if let Some(default) = registry.default_engine_name(&config.search) {
            output.hint(&format!("\"auto\" currently selects '{}'", default));
        }
        return Ok(());
    }

    let query = match cli.query.clone().filter(|q| !q.trim().is_empty()) {
        Some(query) => query,
        None => {
            output.banner();
            match output.prompt("What would you like to research?") {
                Some(query) => query,
                None => bail!("No research query given"),
            }
        }
    };

    let engine = registry.resolve(&config.search.engine, &config.search)?;
    let provider = Provider::from_config(&config.llm)?;
    let llm = provider
        .create_client()
        .await
        .with_context(|| format!("Failed to create {} client", provider.name()))?;

    output.info(&format!(
        "Researching with {} ({}) and the {} search engine",
        provider.name(),
        provider.model(),
        engine.name()
    ));

    let max_depth = config.research.max_depth;
    let coordinator = ResearchCoordinator::new(llm, engine, config.research.clone());

    // Cancelling abandons the whole run; there is nothing to resume
    let outcome = tokio::select! {
        result = coordinator.research_with_depth(&query, max_depth) => result,
        _ = tokio::signal::ctrl_c() => {
            output.warning("Interrupted, research abandoned");
            std::process::exit(130);
        }
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            output.error(&e.to_string());
            return Err(e).context("Deep search failed");
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{}", json);
        return Ok(());
    }

    output.report(&outcome.report);
    if cli.show_findings {
        output.findings(&outcome.findings);
    }
    output.success(&format!(
        "{} branches, {} findings, {} calls in {:.1}s",
        outcome.sub_queries.len(),
        outcome.findings.len(),
        outcome.calls_used,
        outcome.elapsed_ms as f64 / 1000.0
    ));

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose` and the configured level.
fn init_tracing(cli: &Cli, config: &DeepSearchConfig) {
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deepsearch={},warn", level)));

    let layer = if cli.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}
