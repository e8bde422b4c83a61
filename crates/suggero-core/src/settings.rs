//! Engine settings: edit costs, search limits, and result defaults.
//!
//! The engine reads a process-wide `&'static Settings` through `settings()`.
//! Defaults come from the embedded `default_settings.toml`; a host that wants
//! different numbers calls `init_custom` with its own TOML before the first
//! `settings()` read, after which the values are frozen.

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Install a custom TOML. Must happen before anything reads `settings()`;
/// the content is validated here so the singleton can never latch onto a
/// bad configuration.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    if CUSTOM_TOML.set(toml_content).is_err() {
        return Err(SettingsError::AlreadyInitialized);
    }
    Ok(())
}

/// The process-wide settings, parsed on first use.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        match CUSTOM_TOML.get() {
            Some(custom) => parse_settings_toml(custom),
            None => parse_settings_toml(DEFAULT_SETTINGS_TOML),
        }
        // embedded defaults, or custom content already vetted by init_custom
        .expect("settings were validated before the first read")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings TOML failed to parse: {0}")]
    Parse(String),
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings were already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub costs: CostSettings,
    pub limits: LimitSettings,
    pub results: ResultSettings,
}

/// Edit-operation costs. One full change is `base` units; the other entries
/// are charged instead of (never on top of) `base`, except `first_letter_bias`
/// which is added to a non-similar replacement at position 0.
#[derive(Debug, Clone, Deserialize)]
pub struct CostSettings {
    pub base: u32,
    pub swap: u32,
    pub duplicate_letter: u32,
    pub visually_similar: u32,
    pub first_letter_bias: u32,
}

/// Search budget: the cost limit starts at
/// `base * min(query_len * max_cost_scale, max_num_changes)` and only shrinks.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    pub max_num_changes: u32,
    pub max_cost_scale: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSettings {
    pub num_suggestions: usize,
    pub num_changes: u32,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(costs.base);
    check_positive!(costs.swap);
    check_positive!(costs.duplicate_letter);
    check_positive!(costs.visually_similar);

    if s.costs.visually_similar >= s.costs.base {
        return Err(SettingsError::InvalidValue {
            field: "costs.visually_similar".to_string(),
            reason: "must be cheaper than costs.base".to_string(),
        });
    }

    check_positive!(limits.max_num_changes);
    if !(s.limits.max_cost_scale > 0.0 && s.limits.max_cost_scale <= 1.0) {
        return Err(SettingsError::InvalidValue {
            field: "limits.max_cost_scale".to_string(),
            reason: "must be in (0, 1]".to_string(),
        });
    }

    check_positive!(results.num_suggestions);
    check_positive!(results.num_changes);

    Ok(())
}
