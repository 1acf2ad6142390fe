//! Type definitions for user preferences.

use serde::{Deserialize, Serialize};

use crate::document::lenient;

/// The preferences document, persisted under its own key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Formatting preferences.
    pub display: DisplayPreferences,
    /// Reminder settings.
    pub notifications: NotificationPreferences,
    /// Focus timer lengths.
    pub study: StudyPreferences,
}

/// Formatting preferences.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayPreferences {
    /// ISO 4217 currency code for amounts.
    #[serde(deserialize_with = "lenient::text")]
    pub currency: String,
    /// BCP 47 locale for dates and numbers.
    #[serde(deserialize_with = "lenient::text")]
    pub locale: String,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            currency: "EGP".to_string(),
            locale: "en-GB".to_string(),
        }
    }
}

/// Reminder settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    /// Master switch.
    #[serde(deserialize_with = "lenient::flag")]
    pub enabled: bool,
    /// Morning summary reminder.
    #[serde(deserialize_with = "lenient::flag")]
    pub daily_briefing: bool,
}

/// Focus timer lengths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyPreferences {
    /// Focus phase length in minutes.
    #[serde(deserialize_with = "lenient::count")]
    pub focus_minutes: u32,
    /// Break phase length in minutes.
    #[serde(deserialize_with = "lenient::count")]
    pub break_minutes: u32,
}

impl Default for StudyPreferences {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

/// Partial update for [`CodexDB::update_preferences`](crate::CodexDB::update_preferences).
///
/// `None` fields keep their current value.
#[derive(Clone, Debug, Default)]
pub struct PreferencesUpdate {
    /// New currency code.
    pub currency: Option<String>,
    /// New locale.
    pub locale: Option<String>,
    /// Notification master switch.
    pub notifications_enabled: Option<bool>,
    /// Daily briefing switch.
    pub daily_briefing: Option<bool>,
    /// Focus length in minutes.
    pub focus_minutes: Option<u32>,
    /// Break length in minutes.
    pub break_minutes: Option<u32>,
}
