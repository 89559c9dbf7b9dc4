//! User configuration: keybindings and scroll-bar preferences, persisted to disk.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/flick-bar/config.toml` (default `~/.config/flick-bar/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;
use tracing::warn;

use crate::core::{ScrollBarConfig, TimingConfig};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    CyclePreset,
    ToggleDeceleration,
    ToggleAlwaysVisible,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for serialisation).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
        Action::CyclePreset,
        Action::ToggleDeceleration,
        Action::ToggleAlwaysVisible,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::CyclePreset => "cycle_preset",
            Action::ToggleDeceleration => "toggle_deceleration",
            Action::ToggleAlwaysVisible => "toggle_always_visible",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"↑"`, `"Ctrl+c"`, `"q"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            code => key_name(code),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Shift+Up"`, `"Ctrl+c"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&key_name(self.code));
        s
    }

    /// Parse a key string like `"Ctrl+c"`, `"Shift+Up"`, `"q"`, `"Home"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => {
                let n: u8 = s[1..].parse().ok()?;
                KeyCode::F(n)
            }
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── preferences ───────

/// Named scroll-bar configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Ios,
    Combined,
    Growing,
}

impl Preset {
    pub fn next(self) -> Self {
        match self {
            Preset::Default => Preset::Ios,
            Preset::Ios => Preset::Combined,
            Preset::Combined => Preset::Growing,
            Preset::Growing => Preset::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Ios => "ios",
            Preset::Combined => "combined",
            Preset::Growing => "growing",
        }
    }

    fn from_name(s: &str) -> Option<Self> {
        [Preset::Default, Preset::Ios, Preset::Combined, Preset::Growing]
            .into_iter()
            .find(|p| p.name() == s)
    }

    fn base(self) -> ScrollBarConfig {
        match self {
            Preset::Default => ScrollBarConfig::default(),
            Preset::Ios => ScrollBarConfig::ios_style(),
            Preset::Combined => ScrollBarConfig::combined(),
            Preset::Growing => ScrollBarConfig::growing(),
        }
    }
}

pub const HIDE_AFTER_MS_RANGE: (u64, u64) = (250, 10_000);

/// The user-facing knobs layered over a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollBarPrefs {
    pub preset: Preset,
    pub decelerate: bool,
    pub always_visible: bool,
    pub hide_after_ms: u64,
    /// Shorter glide after a fling.
    pub fast_deceleration: bool,
}

impl Default for ScrollBarPrefs {
    fn default() -> Self {
        Self {
            preset: Preset::Default,
            decelerate: true,
            always_visible: false,
            hide_after_ms: 2000,
            fast_deceleration: false,
        }
    }
}

impl ScrollBarPrefs {
    pub fn with_hide_after_ms(mut self, ms: u64) -> Self {
        self.hide_after_ms = ms.clamp(HIDE_AFTER_MS_RANGE.0, HIDE_AFTER_MS_RANGE.1);
        self
    }

    pub fn scroll_bar_config(&self) -> ScrollBarConfig {
        let base = self.preset.base();
        ScrollBarConfig {
            decelerates: self.decelerate,
            always_visible: self.always_visible,
            hide_after: Duration::from_millis(self.hide_after_ms),
            timing: if self.fast_deceleration {
                TimingConfig::fast()
            } else {
                base.timing
            },
            ..base
        }
    }
}

// ───────────────────────────────────────── config ────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected `key = value`")]
    MissingEquals { line: usize },
    #[error("line {line}: unknown setting `{key}`")]
    UnknownKey { line: usize, key: String },
    #[error("line {line}: invalid value `{value}` for `{key}`")]
    InvalidValue { line: usize, key: String, value: String },
}

/// Application configuration: keybindings and scroll-bar preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub prefs: ScrollBarPrefs,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            prefs: ScrollBarPrefs::default(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n), KeyBind::new(Char('u'), n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char(' '), n)]);
        m.insert(Top, vec![KeyBind::new(Home, n), KeyBind::new(Char('g'), n)]);
        m.insert(Bottom, vec![KeyBind::new(End, n), KeyBind::new(Char('G'), KeyModifiers::SHIFT)]);
        m.insert(CyclePreset, vec![KeyBind::new(Char('p'), n)]);
        m.insert(ToggleDeceleration, vec![KeyBind::new(Char('d'), n)]);
        m.insert(ToggleAlwaysVisible, vec![KeyBind::new(Char('v'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n), KeyBind::new(Esc, n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: preset | {}: deceleration | {}: always visible | {}: quit",
            self.short_binding(Action::CyclePreset),
            self.short_binding(Action::ToggleDeceleration),
            self.short_binding(Action::ToggleAlwaysVisible),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read config, using defaults");
                return Self::default();
            }
        };
        Self::parse(&contents).unwrap_or_else(|err| {
            warn!(path = %path.display(), %err, "invalid config, using defaults");
            Self::default()
        })
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut config = Self::default();

        for (index, line) in s.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ParseError::MissingEquals { line: line_no });
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');
            let invalid = || ParseError::InvalidValue {
                line: line_no,
                key: key.to_string(),
                value: value.to_string(),
            };

            match key {
                "preset" => {
                    config.prefs.preset = Preset::from_name(value).ok_or_else(invalid)?;
                }
                "decelerate" => {
                    config.prefs.decelerate = value.parse().map_err(|_| invalid())?;
                }
                "always_visible" => {
                    config.prefs.always_visible = value.parse().map_err(|_| invalid())?;
                }
                "fast_deceleration" => {
                    config.prefs.fast_deceleration = value.parse().map_err(|_| invalid())?;
                }
                "hide_after_ms" => {
                    let ms: u64 = value.parse().map_err(|_| invalid())?;
                    config.prefs = config.prefs.with_hide_after_ms(ms);
                }
                _ => {
                    let Some(action) = Action::from_config_key(key) else {
                        return Err(ParseError::UnknownKey {
                            line: line_no,
                            key: key.to_string(),
                        });
                    };
                    let parsed = value
                        .split(',')
                        .map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect::<Option<Vec<_>>>()
                        .filter(|binds| !binds.is_empty())
                        .ok_or_else(invalid)?;
                    config.bindings.insert(action, parsed);
                }
            }
        }

        Ok(config)
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# flick-bar configuration".to_string(),
            String::new(),
            "# Scroll bar".to_string(),
            "# preset: default, ios, combined, growing".to_string(),
            format!("preset = {}", self.prefs.preset.name()),
            format!("decelerate = {}", self.prefs.decelerate),
            format!("always_visible = {}", self.prefs.always_visible),
            format!("hide_after_ms = {}", self.prefs.hide_after_ms),
            format!("fast_deceleration = {}", self.prefs.fast_deceleration),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/flick-bar/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.prefs = ScrollBarPrefs {
            preset: Preset::Combined,
            decelerate: false,
            always_visible: true,
            hide_after_ms: 900,
            fast_deceleration: true,
        };
        config
            .bindings
            .insert(Action::CyclePreset, vec![KeyBind::new(KeyCode::F(2), KeyModifiers::CONTROL)]);
        assert_eq!(AppConfig::parse(&config.serialise()), Ok(config));
    }

    #[test]
    fn hide_timeout_is_clamped() {
        let config = AppConfig::parse("hide_after_ms = 5").unwrap();
        assert_eq!(config.prefs.hide_after_ms, 250);
        let config = AppConfig::parse("hide_after_ms = 99999").unwrap();
        assert_eq!(config.prefs.hide_after_ms, 10_000);
    }

    #[test]
    fn malformed_lines_are_reported() {
        assert_eq!(AppConfig::parse("preset"), Err(ParseError::MissingEquals { line: 1 }));
        assert_eq!(
            AppConfig::parse("# c\nspeed = 3"),
            Err(ParseError::UnknownKey {
                line: 2,
                key: "speed".into()
            })
        );
        assert!(matches!(
            AppConfig::parse("decelerate = maybe"),
            Err(ParseError::InvalidValue { line: 1, .. })
        ));
        assert!(matches!(
            AppConfig::parse("quit = Hyper+q"),
            Err(ParseError::InvalidValue { .. })
        ));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::parse("[scroll]\npreset = ios\nquit = x").unwrap();
        assert_eq!(config.prefs.preset, Preset::Ios);
        assert!(config.prefs.decelerate);
        assert_eq!(config.bindings[&Action::Quit], vec![KeyBind::new(KeyCode::Char('x'), KeyModifiers::NONE)]);
        assert_eq!(config.bindings[&Action::Top], AppConfig::default_bindings()[&Action::Top]);
    }

    #[test]
    fn key_matching() {
        let config = AppConfig::default();
        assert_eq!(config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)), Some(Action::ScrollDown));
        assert_eq!(config.match_key(key(KeyCode::Char('G'), KeyModifiers::SHIFT)), Some(Action::Bottom));
        assert_eq!(config.match_key(key(KeyCode::Char('j'), KeyModifiers::CONTROL)), None);
    }

    #[test]
    fn prefs_layer_over_preset() {
        let prefs = ScrollBarPrefs {
            preset: Preset::Ios,
            decelerate: false,
            always_visible: true,
            hide_after_ms: 700,
            fast_deceleration: false,
        };
        let config = prefs.scroll_bar_config();
        assert!(!config.decelerates);
        assert_eq!(config.timing, TimingConfig::default());
        let fast = ScrollBarPrefs {
            fast_deceleration: true,
            ..prefs
        };
        assert_eq!(fast.scroll_bar_config().timing, TimingConfig::fast());
        assert!(config.always_visible);
        assert_eq!(config.hide_after, Duration::from_millis(700));
        assert_eq!(config.indicator, ScrollBarConfig::ios_style().indicator);
        assert!(config.validate().is_ok());
        assert_eq!(Preset::Growing.next(), Preset::Default);
    }
}
