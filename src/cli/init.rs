//! Start-up configuration read from the environment.
//!
//! The harness has no options besides `-b`, so everything else is configured
//! through environment variables read once before argument parsing:
//!
//! | Variable            | Effect                                                   |
//! |---------------------|----------------------------------------------------------|
//! | `MLL_DISPLAY_LEVEL` | stderr verbosity (0–4, default 2)                        |
//! | `MLL_EXPR`          | expression compiled into the transformation (see [`crate::graph::transform`]) |
//!
//! [`init_from_env`] builds a [`CliInit`]; the `*_from` variants take the raw
//! values so the conversion logic is testable without touching the process
//! environment.

use crate::displaylevel;
use crate::config::{DISPLAY_LEVEL_DEFAULT, DISPLAY_LEVEL_MAX, ENV_DISPLAY_LEVEL, ENV_EXPR};

/// Initial state derived from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliInit {
    /// Display level the caller should apply via `set_display_level`.
    pub display_level: u32,
    /// Expression source for the graph-backed transformation, if configured.
    pub expression: Option<String>,
}

/// Read all start-up settings from the process environment.
pub fn init_from_env() -> CliInit {
    CliInit {
        display_level: init_display_level(),
        expression: init_expression_from(std::env::var(ENV_EXPR).ok().as_deref()),
    }
}

/// Read the display level from `MLL_DISPLAY_LEVEL`.
pub fn init_display_level() -> u32 {
    init_display_level_from(std::env::var(ENV_DISPLAY_LEVEL).ok().as_deref())
}

/// Testable core of [`init_display_level`].
///
/// Values above [`DISPLAY_LEVEL_MAX`] are clamped. A value that is not an
/// unsigned integer is reported and the default is used.
pub fn init_display_level_from(env_val: Option<&str>) -> u32 {
    if let Some(env) = env_val {
        match env.trim().parse::<u32>() {
            Ok(level) => return level.min(DISPLAY_LEVEL_MAX),
            Err(_) => displaylevel!(
                2,
                "Ignore environment variable setting {}={}: not a valid unsigned value \n",
                ENV_DISPLAY_LEVEL,
                env
            ),
        }
    }
    DISPLAY_LEVEL_DEFAULT
}

/// Testable core of the `MLL_EXPR` lookup: blank values count as unset.
pub fn init_expression_from(env_val: Option<&str>) -> Option<String> {
    env_val
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
