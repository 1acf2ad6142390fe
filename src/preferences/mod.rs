//! User preferences, persisted under their own key.
//!
//! Preferences go through the same merge as the document, so a preferences
//! document written before a setting existed picks up its default.

pub mod types;

pub use types::{
    DisplayPreferences, NotificationPreferences, Preferences, PreferencesUpdate, StudyPreferences,
};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::db::{CodexDB, Commit};
use crate::error::{Result, ValidationError};
use crate::validation::required_label;

/// Longest focus or break phase, in minutes.
pub const MAX_TIMER_MINUTES: u32 = 240;

impl Preferences {
    /// Decodes a merged value group by group.
    ///
    /// A group that does not fit the schema falls back to its defaults.
    /// Blank text settings and out-of-range timer lengths are replaced by
    /// their defaults so a stored `null` never disables a setting.
    pub fn from_merged(value: Value) -> Self {
        let mut map = match value {
            Value::Object(map) => map,
            _ => {
                warn!("Preferences root is not an object, using defaults");
                return Self::default();
            }
        };
        let mut prefs = Self {
            display: decode_group(&mut map, "display"),
            notifications: decode_group(&mut map, "notifications"),
            study: decode_group(&mut map, "study"),
        };
        prefs.fill_blanks();
        prefs
    }

    fn fill_blanks(&mut self) {
        let defaults = Self::default();
        if self.display.currency.trim().is_empty() {
            self.display.currency = defaults.display.currency;
        }
        if self.display.locale.trim().is_empty() {
            self.display.locale = defaults.display.locale;
        }
        if timer_minutes("focusMinutes", self.study.focus_minutes).is_err() {
            self.study.focus_minutes = defaults.study.focus_minutes;
        }
        if timer_minutes("breakMinutes", self.study.break_minutes).is_err() {
            self.study.break_minutes = defaults.study.break_minutes;
        }
    }
}

fn decode_group<T>(map: &mut Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(value) = map.remove(key) else {
        return T::default();
    };
    serde_json::from_value(value).unwrap_or_else(|err| {
        warn!(group = key, error = %err, "Preference group failed to decode, using defaults");
        T::default()
    })
}

fn timer_minutes(field: &str, value: u32) -> std::result::Result<u32, ValidationError> {
    if value == 0 || value > MAX_TIMER_MINUTES {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be between 1 and {MAX_TIMER_MINUTES}, got {value}"),
        ));
    }
    Ok(value)
}

impl CodexDB {
    /// Applies a partial preferences update and saves the preferences key.
    ///
    /// Returns the updated preferences.
    pub fn update_preferences(&mut self, update: PreferencesUpdate) -> Result<Commit<Preferences>> {
        let currency = update
            .currency
            .as_deref()
            .map(|c| required_label("currency", c))
            .transpose()?;
        let locale = update
            .locale
            .as_deref()
            .map(|l| required_label("locale", l))
            .transpose()?;
        let focus = update
            .focus_minutes
            .map(|m| timer_minutes("focusMinutes", m))
            .transpose()?;
        let pause = update
            .break_minutes
            .map(|m| timer_minutes("breakMinutes", m))
            .transpose()?;

        let prefs = self.preferences_mut();
        if let Some(currency) = currency {
            prefs.display.currency = currency.to_uppercase();
        }
        if let Some(locale) = locale {
            prefs.display.locale = locale;
        }
        if let Some(enabled) = update.notifications_enabled {
            prefs.notifications.enabled = enabled;
        }
        if let Some(daily) = update.daily_briefing {
            prefs.notifications.daily_briefing = daily;
        }
        if let Some(focus) = focus {
            prefs.study.focus_minutes = focus;
        }
        if let Some(pause) = pause {
            prefs.study.break_minutes = pause;
        }

        let save = self.persist_preferences();
        Ok(Commit {
            value: self.preferences().clone(),
            save,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::{merge, Shape};
    use crate::storage::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.display.currency, "EGP");
        assert_eq!(prefs.display.locale, "en-GB");
        assert!(!prefs.notifications.enabled);
        assert_eq!(prefs.study.focus_minutes, 25);
        assert_eq!(prefs.study.break_minutes, 5);
    }

    #[test]
    fn test_from_merged_fills_new_settings() {
        let shape = Shape::of::<Preferences>().unwrap();
        let prefs =
            Preferences::from_merged(merge(&shape, &json!({ "display": { "currency": "USD" } })));
        assert_eq!(prefs.display.currency, "USD");
        assert_eq!(prefs.display.locale, "en-GB");
        assert_eq!(prefs.study.focus_minutes, 25);
    }

    #[test]
    fn test_from_merged_bad_value_falls_back() {
        let prefs = Preferences::from_merged(json!({ "display": 3 }));
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_from_merged_null_setting_keeps_the_others() {
        let shape = Shape::of::<Preferences>().unwrap();
        let stored = json!({
            "display": { "currency": "USD", "locale": null },
            "notifications": { "enabled": null, "dailyBriefing": true },
            "study": { "focusMinutes": "50", "breakMinutes": -5 },
        });
        let prefs = Preferences::from_merged(merge(&shape, &stored));

        assert_eq!(prefs.display.currency, "USD");
        assert_eq!(prefs.display.locale, "en-GB");
        assert!(!prefs.notifications.enabled);
        assert!(prefs.notifications.daily_briefing);
        assert_eq!(prefs.study.focus_minutes, 50);
        assert_eq!(prefs.study.break_minutes, 5);
    }

    #[test]
    fn test_update_preferences_saves_own_key() {
        let store = MemoryStore::new();
        let mut db = CodexDB::open_with_store(Box::new(store.clone()), Config::default()).unwrap();

        let commit = db
            .update_preferences(PreferencesUpdate {
                currency: Some("usd".into()),
                focus_minutes: Some(50),
                ..Default::default()
            })
            .unwrap();

        assert!(commit.is_saved());
        assert_eq!(commit.value.display.currency, "USD");
        assert_eq!(commit.value.study.focus_minutes, 50);
        assert!(store.raw("codex_config").is_some());
        assert!(store.raw("codex_v1").is_none());
    }

    #[test]
    fn test_update_preferences_validates_first() {
        let mut db =
            CodexDB::open_with_store(Box::new(MemoryStore::new()), Config::default()).unwrap();
        let err = db
            .update_preferences(PreferencesUpdate {
                locale: Some("ar-EG".into()),
                break_minutes: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(db.preferences().display.locale, "en-GB");
    }
}
