// Presentation rules shared by the dashboard panels
use super::telemetry::{Confidence, DetectionType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Convert "4521" seconds to "01:15:21". Hours are not wrapped at 24.
pub fn format_uptime(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryBand {
    Critical,
    Warning,
    Normal,
}

impl BatteryBand {
    pub fn for_level(level: u8) -> Self {
        if level < 20 {
            BatteryBand::Critical
        } else if level < 40 {
            BatteryBand::Warning
        } else {
            BatteryBand::Normal
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            BatteryBand::Critical => "text-destructive",
            BatteryBand::Warning => "text-warning",
            BatteryBand::Normal => "text-success",
        }
    }
}

/// Relative age of a detection, e.g. "42s ago", "3m ago", "2h ago"
pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);

    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

/// Visual tier of an alert badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Elevated,
    Routine,
}

impl From<Confidence> for AlertSeverity {
    fn from(confidence: Confidence) -> Self {
        match confidence {
            Confidence::High => AlertSeverity::Critical,
            Confidence::Medium => AlertSeverity::Elevated,
            Confidence::Low => AlertSeverity::Routine,
        }
    }
}

impl AlertSeverity {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "bg-destructive text-destructive-foreground",
            AlertSeverity::Elevated => "bg-warning text-warning-foreground",
            AlertSeverity::Routine => "bg-secondary text-secondary-foreground",
        }
    }
}

/// Survivor marker color in the 3D scene
pub fn marker_color(confidence: Confidence) -> u32 {
    match confidence {
        Confidence::High => 0xe63946,
        Confidence::Medium => 0xffb703,
        Confidence::Low => 0x06d6a0,
    }
}

pub fn detection_icon(kind: DetectionType) -> &'static str {
    match kind {
        DetectionType::Rfid => "📟",
        DetectionType::Thermal => "🔥",
        DetectionType::Vibration => "📳",
        DetectionType::Ultrasonic => "🔊",
    }
}

pub fn online_label(online: bool) -> &'static str {
    if online { "Online" } else { "Offline" }
}
