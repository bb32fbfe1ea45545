use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use nexus_command::capability::{CapabilityCategory, CapabilityModule, CapabilityRegistry};
use nexus_command::context::{ContextEntry, ContextStore};
use nexus_command::intent::{Entities, Intent, IntentClassifier, IntentResult};
use nexus_command::planner::{Planner, PlannerAction, PlannerError, RiskLevel};

fn intent_result(intent: Intent, confidence: f32, entities: &[(&str, &str)], needs_confirmation: bool) -> IntentResult {
    let entities: Entities = entities.iter().map(|(k, v)| (*k, v.to_string())).collect();
    IntentResult::new(intent, confidence, entities, String::new(), needs_confirmation, None)
}

#[test]
fn test_shutdown_is_always_confirmed() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);

    for confidence in [0.1, 0.5, 0.95] {
        for flagged in [true, false] {
            let result = intent_result(Intent::PowerControl, confidence, &[("action", "shutdown")], flagged);
            let decision = planner.plan(&result, &context);
            assert_eq!(decision.action, PlannerAction::ConfirmDestructive, "{confidence} {flagged}");
            assert_eq!(decision.risk, RiskLevel::Critical);
            assert_eq!(decision.tool.as_deref(), Some("PowerTool"));
            assert_eq!(decision.parameters["action"], "shutdown");
        }
    }
}

#[test]
fn test_delete_requires_confirmation() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::FileOperation, 0.9, &[("action", "delete"), ("target", "notes.txt")], true);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::ConfirmDestructive);
    assert_eq!(decision.risk, RiskLevel::High);
    assert_eq!(decision.tool.as_deref(), Some("FileManagerTool"));
    assert_eq!(decision.parameters["target"], "notes.txt");
    assert!(decision.validate(&result, &planner.registry()).is_ok());
}

#[test]
fn test_flagged_result_is_confirmed_even_at_low_risk() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::Screenshot, 0.9, &[], true);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::ConfirmDestructive);
    assert_eq!(decision.risk, RiskLevel::Low);
}

#[test]
fn test_execute_carries_tool_and_parameters() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::PlayMusic, 0.85, &[("query", "lofi"), ("platform", "spotify")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::ExecuteTool);
    assert_eq!(decision.risk, RiskLevel::None);
    assert_eq!(decision.tool.as_deref(), Some("MediaPlayerTool"));
    assert_eq!(decision.parameters["query"], "lofi");
    assert_eq!(decision.parameters["platform"], "spotify");
    assert!(decision.clarification.is_none());
}

#[test]
fn test_low_confidence_asks_intent_question() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::WebSearch, 0.4, &[("query", "cats")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::AskClarification);
    assert_eq!(decision.clarification.as_deref(), Some("What should I search for?"));
}

#[test]
fn test_missing_required_parameter() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::PlayMusic, 0.9, &[], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::AskClarification);
    assert_eq!(decision.clarification.as_deref(), Some("What would you like me to play?"));
    assert!(decision.tool.is_none());
}

#[test]
fn test_unknown_gets_generic_question() {
    let planner = Planner::new();
    let mut context = ContextStore::in_memory(20);
    let unknown = IntentResult::unknown();

    let decision = planner.plan(&unknown, &context);
    assert_eq!(decision.action, PlannerAction::AskClarification);
    let question = decision.clarification.unwrap();
    assert!(question.contains("Could you say it another way?"));

    context.add_entry(ContextEntry::new("play lofi").with_feature("media")).unwrap();
    let decision = planner.plan(&unknown, &context);
    assert!(decision.clarification.unwrap().contains("media"));
}

#[test]
fn test_unimplemented_capability_offers_to_build() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::Reminder, 0.75, &[("query", "call mom")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::OfferToBuild);
    assert_eq!(decision.fallback_path.as_deref(), Some("Use the Clock or Alarms app"));
    assert_eq!(decision.guidance_steps.len(), 4);
    assert!(decision.reasoning.contains("scheduler"));
    assert!(decision.tool.is_none());
    assert!(decision.validate(&result, &planner.registry()).is_ok());
}

#[test]
fn test_unimplemented_capability_offers_to_build_at_low_confidence() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);

    for confidence in [0.2, 0.4, 0.59] {
        let result = intent_result(Intent::Reminder, confidence, &[], false);
        let decision = planner.plan(&result, &context);

        assert_eq!(decision.action, PlannerAction::OfferToBuild, "{confidence}");
        assert!(!decision.guidance_steps.is_empty());
        assert_eq!(decision.fallback_path.as_deref(), Some("Use the Clock or Alarms app"));
        assert!(decision.clarification.is_none());
        assert!(decision.validate(&result, &planner.registry()).is_ok());
    }
}

#[test]
fn test_context_folder_fills_missing_target() {
    let planner = Planner::new();
    let mut context = ContextStore::in_memory(20);
    context.add_entry(ContextEntry::new("open downloads").with_folder("downloads")).unwrap();
    let result = intent_result(Intent::ScanFolder, 0.85, &[], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::ExecuteTool);
    assert_eq!(decision.tool.as_deref(), Some("FileScannerTool"));
    assert_eq!(decision.parameters["contextFolder"], "downloads");
    assert!(!decision.parameters.contains_key("target"));
}

#[test]
fn test_explicit_target_beats_context() {
    let planner = Planner::new();
    let mut context = ContextStore::in_memory(20);
    context.add_entry(ContextEntry::new("open downloads").with_folder("downloads")).unwrap();
    let result = intent_result(Intent::OpenFolder, 0.9, &[("target", "documents")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.parameters["target"], "documents");
    assert!(!decision.parameters.contains_key("contextFolder"));
}

#[test]
fn test_context_app_fills_missing_app() {
    let planner = Planner::new();
    let mut context = ContextStore::in_memory(20);
    let result = intent_result(Intent::CloseApp, 0.85, &[], false);

    let decision = planner.plan(&result, &context);
    assert_eq!(decision.action, PlannerAction::AskClarification);
    assert_eq!(decision.clarification.as_deref(), Some("Which app should I close?"));

    context.add_entry(ContextEntry::new("open chrome").with_app("chrome")).unwrap();
    let decision = planner.plan(&result, &context);
    assert_eq!(decision.action, PlannerAction::ExecuteTool);
    assert_eq!(decision.risk, RiskLevel::Medium);
    assert_eq!(decision.parameters["contextApp"], "chrome");
}

#[test]
fn test_file_operations_never_borrow_a_folder() {
    let planner = Planner::new();
    let mut context = ContextStore::in_memory(20);
    context.add_entry(ContextEntry::new("open downloads").with_folder("downloads")).unwrap();
    let result = intent_result(Intent::FileOperation, 0.9, &[("action", "copy")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::AskClarification);
}

#[test]
fn test_validate_catches_ungated_execution() {
    let planner = Planner::new();
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::PlayMusic, 0.9, &[("query", "lofi")], false);
    let decision = planner.plan(&result, &context);
    let registry = planner.registry();
    assert!(decision.validate(&result, &registry).is_ok());

    let flagged = intent_result(Intent::PlayMusic, 0.9, &[("query", "lofi")], true);
    assert!(matches!(
        decision.validate(&flagged, &registry),
        Err(PlannerError::UngatedExecution { intent: Intent::PlayMusic, .. })
    ));

    let mut risky = decision.clone();
    risky.risk = RiskLevel::High;
    assert!(matches!(risky.validate(&result, &registry), Err(PlannerError::UngatedExecution { .. })));

    let mut toolless = decision.clone();
    toolless.tool = None;
    assert_eq!(toolless.validate(&result, &registry), Err(PlannerError::MissingTool(Intent::PlayMusic)));

    let mut mute = decision;
    mute.action = PlannerAction::AskClarification;
    assert_eq!(mute.validate(&result, &registry), Err(PlannerError::EmptyQuestion(Intent::PlayMusic)));
}

#[test]
fn test_custom_registry() {
    let registry = CapabilityRegistry::from_modules(vec![CapabilityModule::planned(
        Intent::Weather,
        CapabilityCategory::Web,
        "Report the weather",
        "Call a forecast API",
    )]);
    let planner = Planner::with_registry(registry);
    let context = ContextStore::in_memory(20);
    let result = intent_result(Intent::Weather, 0.9, &[("target", "paris")], false);

    let decision = planner.plan(&result, &context);

    assert_eq!(decision.action, PlannerAction::OfferToBuild);
    assert!(decision.reasoning.contains("forecast API"));
    assert_eq!(decision.fallback_path.as_deref(), Some("Do it manually for now"));
    assert!(decision.validate(&result, &planner.registry()).is_ok());

    // Nothing registered for music, so it cannot execute either.
    let music = intent_result(Intent::PlayMusic, 0.9, &[("query", "lofi")], false);
    assert_eq!(planner.plan(&music, &context).action, PlannerAction::OfferToBuild);
}

#[tokio::test]
async fn test_classified_inputs_always_validate() {
    let planner = Planner::new();
    let classifier = IntentClassifier::new(planner.registry(), 0.8, Duration::from_millis(100));
    let mut context = ContextStore::in_memory(20);
    let registry: Arc<CapabilityRegistry> = planner.registry();
    let inputs = [
        "play lofi",
        "shutdown",
        "restart the computer",
        "lock screen",
        "delete the file notes.txt",
        "move report.pdf to documents",
        "open downloads",
        "scan that folder",
        "close chrome",
        "install vlc",
        "volume 40%",
        "pause",
        "take a screenshot",
        "turn on wifi",
        "what is the weather in paris",
        "search for rust tutorials",
        "remind me to call mom",
        "email bob",
        "schedule a meeting tomorrow",
        "tell me a story about dragons",
        "",
    ];

    for input in inputs {
        let c = classifier.classify(input, &mut context, &CancellationToken::new()).await;
        let decision = planner.plan(&c.result, &context);
        assert!(decision.validate(&c.result, &registry).is_ok(), "{input}: {decision:?}");
        if decision.risk.requires_confirmation() {
            assert_ne!(decision.action, PlannerAction::ExecuteTool, "{input}");
        }
    }
}

#[tokio::test]
async fn test_move_command_is_a_file_operation() {
    let planner = Planner::new();
    let classifier = IntentClassifier::new(planner.registry(), 0.8, Duration::from_millis(100));
    let mut context = ContextStore::in_memory(20);

    let c = classifier.classify("move report.pdf to documents", &mut context, &CancellationToken::new()).await;
    assert_eq!(c.result.intent, Intent::FileOperation);

    let decision = planner.plan(&c.result, &context);
    assert_eq!(decision.action, PlannerAction::ExecuteTool);
    assert_eq!(decision.risk, RiskLevel::Medium);
    assert_eq!(decision.parameters["destination"], "documents");
}
