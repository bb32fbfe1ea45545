use std::collections::HashMap;
use super::types::{CapabilityCategory, CapabilityModule};
use crate::intent::types::Intent;

/// Read-only lookup of what the assistant can do.
///
/// Built once (normally by the planner) and shared by reference afterwards.
/// There is no mutation API beyond construction.
#[derive(Debug, Clone)]
pub struct CapabilityRegistry {
    modules: Vec<CapabilityModule>,
    by_intent: HashMap<Intent, usize>,
}

impl CapabilityRegistry {
    pub fn from_modules(modules: Vec<CapabilityModule>) -> Self {
        let mut by_intent = HashMap::new();
        for (i, module) in modules.iter().enumerate() {
            // First registration wins.
            by_intent.entry(module.intent).or_insert(i);
        }
        Self { modules, by_intent }
    }

    /// The assistant's shipped capability table.
    pub fn builtin() -> Self {
        use CapabilityCategory::*;
        Self::from_modules(vec![
            CapabilityModule::implemented(Intent::PowerControl, System, "Shut down, restart, sleep or lock the computer"),
            CapabilityModule::implemented(Intent::VolumeControl, Media, "Change or mute the system volume"),
            CapabilityModule::implemented(Intent::MediaControl, Media, "Pause, resume or skip the current track"),
            CapabilityModule::implemented(Intent::PlayMusic, Media, "Play music by song, artist or mood"),
            CapabilityModule::implemented(Intent::Screenshot, System, "Capture the screen"),
            CapabilityModule::implemented(Intent::OpenFolder, Files, "Open a known folder or path in the file explorer"),
            CapabilityModule::implemented(Intent::ScanFolder, Files, "Scan a folder and summarise its contents"),
            CapabilityModule::implemented(Intent::FileOperation, Files, "Delete, move, rename or copy files"),
            CapabilityModule::implemented(Intent::CloseApp, Apps, "Close a running application"),
            CapabilityModule::implemented(Intent::InstallApp, Apps, "Install an application through the package manager"),
            CapabilityModule::implemented(Intent::OpenApp, Apps, "Launch an application"),
            CapabilityModule::implemented(Intent::WebSearch, Web, "Search the web"),
            CapabilityModule::implemented(Intent::Weather, Web, "Report the current weather"),
            CapabilityModule::implemented(Intent::SystemControl, System, "Toggle wifi, bluetooth, brightness and similar settings"),
            CapabilityModule::planned(
                Intent::Reminder,
                Productivity,
                "Set timed reminders",
                "Add a scheduler that persists reminders and raises a desktop notification when due",
            ),
            CapabilityModule::planned(
                Intent::SendEmail,
                Productivity,
                "Compose and send email",
                "Integrate an SMTP or mail-provider API with an address book and a draft review step",
            ),
            CapabilityModule::planned(
                Intent::CalendarEvent,
                Productivity,
                "Create calendar events",
                "Connect a calendar provider and map dates, times and attendees from the request",
            ),
        ])
    }

    pub fn get(&self, intent: Intent) -> Option<&CapabilityModule> {
        self.by_intent.get(&intent).and_then(|&i| self.modules.get(i))
    }

    pub fn is_implemented(&self, intent: Intent) -> bool {
        self.get(intent).map(|m| m.implemented).unwrap_or(false)
    }

    pub fn by_category(&self, category: CapabilityCategory) -> Vec<&CapabilityModule> {
        self.modules.iter().filter(|m| m.category == category).collect()
    }

    pub fn all(&self) -> &[CapabilityModule] {
        &self.modules
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = CapabilityRegistry::builtin();
        assert!(registry.is_implemented(Intent::PlayMusic));
        assert!(!registry.is_implemented(Intent::Reminder));
        assert!(!registry.is_implemented(Intent::Unknown), "unknown is never registered");

        let reminder = registry.get(Intent::Reminder).unwrap();
        assert!(reminder.build_plan.is_some());
    }

    #[test]
    fn test_by_category() {
        let registry = CapabilityRegistry::builtin();
        let productivity = registry.by_category(CapabilityCategory::Productivity);
        assert_eq!(productivity.len(), 3);
        assert!(productivity.iter().all(|m| !m.implemented));
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = CapabilityRegistry::from_modules(vec![
            CapabilityModule::implemented(Intent::Weather, CapabilityCategory::Web, "first"),
            CapabilityModule::implemented(Intent::Weather, CapabilityCategory::Web, "second"),
        ]);
        assert_eq!(registry.get(Intent::Weather).unwrap().description, "first");
    }
}
