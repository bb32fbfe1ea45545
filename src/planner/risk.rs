use super::types::RiskLevel;
use crate::intent::types::Intent;

/// Static (intent, entity action) → risk table.
pub fn risk_for(intent: Intent, action: Option<&str>) -> RiskLevel {
    match (intent, action) {
        (Intent::PowerControl, Some("shutdown" | "restart")) => RiskLevel::Critical,
        (Intent::PowerControl, Some("sleep" | "lock")) => RiskLevel::Low,
        (Intent::FileOperation, Some("delete")) => RiskLevel::High,
        (Intent::FileOperation, Some("move" | "rename")) => RiskLevel::Medium,
        (Intent::CloseApp | Intent::SystemControl | Intent::InstallApp, _) => RiskLevel::Medium,
        (
            Intent::WebSearch | Intent::Weather | Intent::PlayMusic | Intent::MediaControl | Intent::VolumeControl,
            _,
        ) => RiskLevel::None,
        (Intent::Screenshot | Intent::OpenApp, _) => RiskLevel::Low,
        _ => RiskLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mappings() {
        assert_eq!(risk_for(Intent::PowerControl, Some("shutdown")), RiskLevel::Critical);
        assert_eq!(risk_for(Intent::PowerControl, Some("restart")), RiskLevel::Critical);
        assert_eq!(risk_for(Intent::PowerControl, Some("lock")), RiskLevel::Low);
        assert_eq!(risk_for(Intent::PowerControl, None), RiskLevel::Low);
        assert_eq!(risk_for(Intent::FileOperation, Some("delete")), RiskLevel::High);
        assert_eq!(risk_for(Intent::FileOperation, Some("rename")), RiskLevel::Medium);
        assert_eq!(risk_for(Intent::FileOperation, Some("copy")), RiskLevel::Low);
        assert_eq!(risk_for(Intent::InstallApp, None), RiskLevel::Medium);
        assert_eq!(risk_for(Intent::VolumeControl, Some("mute")), RiskLevel::None);
        assert_eq!(risk_for(Intent::Screenshot, None), RiskLevel::Low);
    }

    #[test]
    fn test_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High.requires_confirmation());
        assert!(!RiskLevel::Medium.requires_confirmation());
    }
}
