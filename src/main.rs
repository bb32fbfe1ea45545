use anyhow::Context;
use nexus_command::config::Config;
use nexus_command::planner::{PlannerAction, PlannerDecision};
use nexus_command::services::credentials::EnvCredentials;
use nexus_command::services::dispatch::DryRunDispatcher;
use nexus_command::session::Session;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing tracing subscriber")?;

    let config = Config::from_env().context("reading configuration")?;
    let session = Session::from_config(&config, &EnvCredentials::default());
    let dispatcher = DryRunDispatcher;

    tracing::info!(context = %config.context_path.display(), "Nexus command console ready. Type 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // A destructive decision waiting for yes/no.
    let mut pending: Option<PlannerDecision> = None;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "forget" | "clear context" => {
                session.clear_context().await;
                println!("Context cleared.");
                continue;
            }
            "stats" => {
                println!("{:#?}", session.telemetry());
                continue;
            }
            "yes" | "y" | "confirm" if pending.is_some() => {
                if let Some(decision) = pending.take() {
                    let report = session.execute(&decision, &dispatcher, true).await?;
                    println!("{}", report.outcome);
                }
                continue;
            }
            "no" | "n" | "cancel" if pending.is_some() => {
                if let Some(decision) = pending.take() {
                    session.decline(&decision).await;
                    println!("Cancelled.");
                }
                continue;
            }
            _ => {}
        }

        // Any new command drops an unanswered confirmation.
        pending = None;

        // Ctrl+C during a slow remote call degrades that turn to the local result.
        let cancel = CancellationToken::new();
        let turn = tokio::select! {
            turn = session.handle(input, &cancel) => turn,
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                session.handle(input, &cancel).await
            }
        };

        let turn = match turn {
            Ok(turn) => turn,
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                continue;
            }
        };

        let decision = turn.decision;
        println!(
            "[{} {:.2} {:?}] {:?} risk={:?}",
            decision.intent, turn.classification.result.confidence, turn.classification.source, decision.action, decision.risk
        );
        match decision.action {
            PlannerAction::ExecuteTool => {
                let report = session.execute(&decision, &dispatcher, false).await?;
                println!("{}", report.outcome);
            }
            PlannerAction::AskClarification => {
                println!("{}", decision.clarification.as_deref().unwrap_or_default());
            }
            PlannerAction::ConfirmDestructive => {
                println!(
                    "This will run {} with {}. Proceed? (yes/no)",
                    decision.tool.as_deref().unwrap_or("an action"),
                    serde_json::Value::Object(decision.parameters.clone())
                );
                pending = Some(decision);
            }
            PlannerAction::OfferToBuild => {
                println!("I can't do that yet. {}", decision.reasoning);
                if let Some(path) = &decision.fallback_path {
                    println!("Meanwhile: {}", path);
                }
                for (i, step) in decision.guidance_steps.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
            }
        }
    }

    tracing::info!("Nexus command console stopped.");
    Ok(())
}
