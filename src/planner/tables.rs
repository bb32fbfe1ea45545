//! Closed, pre-authored lookup tables the planner draws its wording from.

use crate::intent::types::Intent;

/// Logical tool the dispatcher should run for an intent.
pub fn tool_for(intent: Intent) -> Option<&'static str> {
    let tool = match intent {
        Intent::PlayMusic | Intent::MediaControl => "MediaPlayerTool",
        Intent::VolumeControl => "VolumeTool",
        Intent::OpenApp | Intent::CloseApp => "AppLauncherTool",
        Intent::InstallApp => "PackageInstallerTool",
        Intent::WebSearch => "WebSearchTool",
        Intent::Weather => "WeatherTool",
        Intent::OpenFolder => "FileExplorerTool",
        Intent::ScanFolder => "FileScannerTool",
        Intent::FileOperation => "FileManagerTool",
        Intent::Screenshot => "ScreenshotTool",
        Intent::PowerControl => "PowerTool",
        Intent::SystemControl => "SystemControlTool",
        Intent::Reminder | Intent::SendEmail | Intent::CalendarEvent | Intent::Unknown => return None,
    };
    Some(tool)
}

pub fn required_parameters(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::PlayMusic => &["query"],
        Intent::WebSearch => &["query"],
        Intent::OpenApp | Intent::CloseApp | Intent::InstallApp => &["app"],
        Intent::OpenFolder | Intent::ScanFolder => &["target"],
        Intent::FileOperation => &["action", "target"],
        Intent::PowerControl | Intent::MediaControl | Intent::VolumeControl => &["action"],
        Intent::SystemControl => &["target"],
        _ => &[],
    }
}

pub fn clarification_for(intent: Intent) -> Option<&'static str> {
    let question = match intent {
        Intent::PlayMusic => "What would you like me to play?",
        Intent::OpenApp => "Which app should I open?",
        Intent::CloseApp => "Which app should I close?",
        Intent::InstallApp => "Which app should I install?",
        Intent::WebSearch => "What should I search for?",
        Intent::OpenFolder => "Which folder should I open?",
        Intent::ScanFolder => "Which folder should I scan?",
        Intent::FileOperation => "Which file, and what should I do with it?",
        Intent::PowerControl => "Do you want to shut down, restart, sleep, or lock the computer?",
        Intent::VolumeControl => "Should I turn the volume up, down, or mute it?",
        Intent::MediaControl => "Should I pause, resume, or skip the track?",
        Intent::SystemControl => "Which setting should I change, and how?",
        Intent::Weather => "Which city should I check the weather for?",
        _ => return None,
    };
    Some(question)
}

pub fn generic_clarification(last_feature: Option<&str>) -> String {
    match last_feature {
        Some(feature) => format!(
            "I'm not sure what you meant. Is this about {} like before, or something else?",
            feature
        ),
        None => "I'm not sure what you'd like me to do. Could you say it another way?".to_string(),
    }
}

const REMINDER_STEPS: &[&str] = &[
    "Open the Clock or Alarms app",
    "Choose Alarm or Timer",
    "Set the time and add a label for the reminder",
    "Save it and keep notifications enabled",
];

const EMAIL_STEPS: &[&str] = &[
    "Open your mail app or webmail",
    "Start a new message",
    "Fill in the recipient, subject and body",
    "Review and send",
];

const CALENDAR_STEPS: &[&str] = &[
    "Open your calendar app",
    "Pick the date and time slot",
    "Add a title and invite attendees",
    "Save the event",
];

const MANUAL_STEPS: &[&str] = &[
    "Open the app that normally handles this task",
    "Complete the steps by hand",
    "Ask me again later; the capability is on the build list",
];

/// Manual route and step-by-step guidance for things the assistant cannot do yet.
pub fn guidance_for(intent: Intent) -> (&'static str, &'static [&'static str]) {
    match intent {
        Intent::Reminder => ("Use the Clock or Alarms app", REMINDER_STEPS),
        Intent::SendEmail => ("Use your mail client", EMAIL_STEPS),
        Intent::CalendarEvent => ("Use your calendar app", CALENDAR_STEPS),
        _ => ("Do it manually for now", MANUAL_STEPS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_executable_intent_has_a_tool() {
        for intent in Intent::ALL {
            let unimplemented = matches!(intent, Intent::Reminder | Intent::SendEmail | Intent::CalendarEvent);
            assert_eq!(tool_for(intent).is_some(), !unimplemented, "{intent}");
        }
    }

    #[test]
    fn test_required_parameters_have_questions() {
        for intent in Intent::ALL {
            if !required_parameters(intent).is_empty() {
                assert!(clarification_for(intent).is_some(), "{intent}");
            }
        }
    }

    #[test]
    fn test_guidance_never_empty() {
        for intent in Intent::ALL {
            assert!(!guidance_for(intent).1.is_empty());
        }
    }
}
