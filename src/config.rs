use once_cell::sync::Lazy;
use std::str::FromStr;
use std::sync::OnceLock;

pub const DEFAULT_MAX_STABILIZATION_ROUNDS: usize = 100;
pub const DEFAULT_DOUBLE_CLICK_SECS: f64 = 0.25;
pub const DEFAULT_DRAG_THRESHOLD_PX: f32 = 4.0;
pub const DEFAULT_SCROLL_SPEED: f32 = 20.0;

static GLOBAL_CONFIG: Lazy<LayoutConfig> = Lazy::new(LayoutConfig::from_env);

/// Tunables for the layout scheduler and input polling.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Upper bound on stabilization passes per `clean_tree` call.
    pub max_stabilization_rounds: usize,
    pub double_click_secs: f64,
    pub drag_threshold_px: f32,
    /// Pixels scrolled per wheel step for newly created panels.
    pub default_scroll_speed: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_stabilization_rounds: DEFAULT_MAX_STABILIZATION_ROUNDS,
            double_click_secs: DEFAULT_DOUBLE_CLICK_SECS,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            default_scroll_speed: DEFAULT_SCROLL_SPEED,
        }
    }
}

impl LayoutConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(rounds) = env_value::<usize>("RFGUI_LAYOUT_MAX_ROUNDS") {
            config.max_stabilization_rounds = rounds.max(1);
        }
        if let Some(secs) = env_value::<f64>("RFGUI_DOUBLE_CLICK_SECS") {
            config.double_click_secs = secs;
        }
        if let Some(px) = env_value::<f32>("RFGUI_DRAG_THRESHOLD_PX") {
            config.drag_threshold_px = px;
        }
        if let Some(speed) = env_value::<f32>("RFGUI_SCROLL_SPEED") {
            config.default_scroll_speed = speed;
        }
        config
    }

    /// Process-wide config read from the environment on first use.
    pub fn global() -> &'static LayoutConfig {
        &GLOBAL_CONFIG
    }
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring unparsable config override");
            None
        }
    }
}

pub(crate) fn trace_layout_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("RFGUI_TRACE_LAYOUT").is_ok())
}
