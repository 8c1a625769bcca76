//! Settings model: work minutes, break minutes and force-focus seconds.
//!
//! Settings are loaded from the preference store with defaults of
//! `(25, 5, 60)`. Edits go through [`SettingsForm`], which validates each
//! field into `[0, 999]` before anything is saved.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::prefs::{PreferenceError, PreferenceStore};
use crate::types::DurationSettings;

/// Smallest accepted value for any field.
pub const MIN_VALUE: i64 = 0;

/// Largest accepted value for any field.
pub const MAX_VALUE: i64 = 999;

// ============================================================================
// SettingField
// ============================================================================

/// The three editable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    /// Work phase length in minutes
    WorkMinutes,
    /// Break phase length in minutes
    BreakMinutes,
    /// Delay before the break window takes focus back, in seconds
    ForceFocusSeconds,
}

impl SettingField {
    /// Every field, in form order.
    pub const ALL: [SettingField; 3] = [
        SettingField::WorkMinutes,
        SettingField::BreakMinutes,
        SettingField::ForceFocusSeconds,
    ];

    /// Preference key the field is persisted under.
    pub fn key(&self) -> &'static str {
        match self {
            SettingField::WorkMinutes => "workMinutes",
            SettingField::BreakMinutes => "breakMinutes",
            SettingField::ForceFocusSeconds => "forceWindowFocusDuration",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SettingField::WorkMinutes => "Work duration in minutes",
            SettingField::BreakMinutes => "Break duration in minutes",
            SettingField::ForceFocusSeconds => "Force window focus in seconds",
        }
    }

    /// Looks a field up by its short name (`work`, `break`, `focus`) or its
    /// preference key, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        SettingField::ALL.into_iter().find(|field| {
            field.short_name().eq_ignore_ascii_case(name) || field.key().eq_ignore_ascii_case(name)
        })
    }

    /// Short name used on the console.
    pub fn short_name(&self) -> &'static str {
        match self {
            SettingField::WorkMinutes => "work",
            SettingField::BreakMinutes => "break",
            SettingField::ForceFocusSeconds => "focus",
        }
    }

    /// Value used when nothing is stored.
    pub fn default_value(&self) -> u32 {
        match self {
            SettingField::WorkMinutes => 25,
            SettingField::BreakMinutes => 5,
            SettingField::ForceFocusSeconds => 60,
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SettingsError
// ============================================================================

/// Errors raised while validating or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Input was not an integer.
    #[error("{field}: '{input}' is not a number")]
    NotANumber {
        /// Field being edited
        field: SettingField,
        /// Rejected text
        input: String,
    },

    /// Input was outside `[MIN_VALUE, MAX_VALUE]`.
    #[error("{field}: {value} is out of range ({}-{})", MIN_VALUE, MAX_VALUE)]
    OutOfRange {
        /// Field being edited
        field: SettingField,
        /// Rejected value
        value: i64,
    },

    /// Edit named a field that does not exist.
    #[error("unknown setting '{0}' (expected work, break or focus)")]
    UnknownField(String),

    /// Validated settings could not be persisted.
    #[error("failed to save settings: {0}")]
    Store(#[from] PreferenceError),
}

impl SettingsError {
    /// Returns true if the error came from user input rather than storage.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::NotANumber { .. } | Self::OutOfRange { .. } | Self::UnknownField(_)
        )
    }
}

/// Checks that `value` lies in `[0, 999]`.
///
/// # Errors
///
/// Returns `SettingsError::OutOfRange` otherwise.
pub fn validate(field: SettingField, value: i64) -> Result<u32, SettingsError> {
    if (MIN_VALUE..=MAX_VALUE).contains(&value) {
        // Range check above guarantees the value fits.
        Ok(value as u32)
    } else {
        Err(SettingsError::OutOfRange { field, value })
    }
}

/// Parses and validates raw form input.
///
/// # Errors
///
/// Returns `SettingsError::NotANumber` for non-integer text and
/// `SettingsError::OutOfRange` for values outside `[0, 999]`.
pub fn parse_field(field: SettingField, input: &str) -> Result<u32, SettingsError> {
    let trimmed = input.trim();
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| SettingsError::NotANumber {
            field,
            input: trimmed.to_string(),
        })?;
    validate(field, value)
}

// ============================================================================
// Settings
// ============================================================================

/// Validated user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Work phase length in minutes
    pub work_minutes: u32,
    /// Break phase length in minutes
    pub break_minutes: u32,
    /// Force-focus delay in seconds
    pub force_focus_seconds: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: SettingField::WorkMinutes.default_value(),
            break_minutes: SettingField::BreakMinutes.default_value(),
            force_focus_seconds: SettingField::ForceFocusSeconds.default_value(),
        }
    }
}

impl Settings {
    /// Loads settings from the store, falling back to defaults.
    ///
    /// A stored value outside `[0, 999]` is ignored in favour of the default.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let read = |field: SettingField| {
            let fallback = i64::from(field.default_value());
            let stored = store.get_int(field.key(), fallback);
            validate(field, stored).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring stored setting");
                field.default_value()
            })
        };

        Self {
            work_minutes: read(SettingField::WorkMinutes),
            break_minutes: read(SettingField::BreakMinutes),
            force_focus_seconds: read(SettingField::ForceFocusSeconds),
        }
    }

    /// Persists all three values.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a write.
    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        for field in SettingField::ALL {
            store.set_int(field.key(), i64::from(self.get(field)))?;
        }
        Ok(())
    }

    /// Returns the value of one field.
    pub fn get(&self, field: SettingField) -> u32 {
        match field {
            SettingField::WorkMinutes => self.work_minutes,
            SettingField::BreakMinutes => self.break_minutes,
            SettingField::ForceFocusSeconds => self.force_focus_seconds,
        }
    }

    /// Converts to the second-based durations the timer runs on.
    pub fn durations(&self) -> DurationSettings {
        DurationSettings::new(
            self.work_minutes * 60,
            self.break_minutes * 60,
            self.force_focus_seconds,
        )
    }
}

// ============================================================================
// SettingEdit
// ============================================================================

/// One `name=value` edit typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingEdit {
    /// Field name as typed
    pub name: String,
    /// Raw value text
    pub input: String,
}

impl SettingEdit {
    /// Creates an edit.
    pub fn new(name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }

    /// Parses a `name=value` token. A token without `=` has an empty value.
    pub fn parse(token: &str) -> Self {
        match token.split_once('=') {
            Some((name, input)) => Self::new(name.trim(), input.trim()),
            None => Self::new(token.trim(), ""),
        }
    }
}

// ============================================================================
// SettingsForm
// ============================================================================

/// Raw, unvalidated settings input.
///
/// Fields hold text exactly as the user typed it, prefilled from the
/// current settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    /// Work minutes input
    pub work_minutes: String,
    /// Break minutes input
    pub break_minutes: String,
    /// Force-focus seconds input
    pub force_focus_seconds: String,
}

impl SettingsForm {
    /// Creates a form prefilled with `current`.
    pub fn from_settings(current: &Settings) -> Self {
        Self {
            work_minutes: current.work_minutes.to_string(),
            break_minutes: current.break_minutes.to_string(),
            force_focus_seconds: current.force_focus_seconds.to_string(),
        }
    }

    /// Replaces the input text of one field.
    pub fn set(&mut self, field: SettingField, input: impl Into<String>) {
        let input = input.into();
        match field {
            SettingField::WorkMinutes => self.work_minutes = input,
            SettingField::BreakMinutes => self.break_minutes = input,
            SettingField::ForceFocusSeconds => self.force_focus_seconds = input,
        }
    }

    /// Applies console edits to the form text.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::UnknownField` if an edit names no field; the
    /// form is left unchanged in that case.
    pub fn apply_edits(&mut self, edits: &[SettingEdit]) -> Result<(), SettingsError> {
        let mut edited = self.clone();
        for edit in edits {
            let field = SettingField::from_name(&edit.name)
                .ok_or_else(|| SettingsError::UnknownField(edit.name.clone()))?;
            edited.set(field, edit.input.as_str());
        }
        *self = edited;
        Ok(())
    }

    /// Validates every field without saving.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in form order.
    pub fn validate(&self) -> Result<Settings, SettingsError> {
        Ok(Settings {
            work_minutes: parse_field(SettingField::WorkMinutes, &self.work_minutes)?,
            break_minutes: parse_field(SettingField::BreakMinutes, &self.break_minutes)?,
            force_focus_seconds: parse_field(
                SettingField::ForceFocusSeconds,
                &self.force_focus_seconds,
            )?,
        })
    }

    /// Validates, persists, then hands the new settings to `on_submit`.
    ///
    /// Nothing is saved and `on_submit` is not called if any field is
    /// invalid.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a store error.
    pub fn submit<F>(&self, store: &dyn PreferenceStore, on_submit: F) -> Result<Settings, SettingsError>
    where
        F: FnOnce(&Settings),
    {
        let settings = self.validate()?;
        settings.save(store)?;
        info!(
            work_minutes = settings.work_minutes,
            break_minutes = settings.break_minutes,
            force_focus_seconds = settings.force_focus_seconds,
            "Settings saved"
        );
        on_submit(&settings);
        Ok(settings)
    }
}

// ============================================================================
// Tests
// ============================================================================
