// config.rs — Compile-time configuration constants.

// Default stderr verbosity (normal).
// Can be overridden by the MLL_DISPLAY_LEVEL environment variable.
pub const DISPLAY_LEVEL_DEFAULT: u32 = 2;

// Highest meaningful display level (verbose).
pub const DISPLAY_LEVEL_MAX: u32 = 4;

// Environment variable selecting the display level.
pub const ENV_DISPLAY_LEVEL: &str = "MLL_DISPLAY_LEVEL";

// Environment variable holding the expression compiled into the
// transformation when no foreign `mll` is linked.
pub const ENV_EXPR: &str = "MLL_EXPR";

// Fractional digits printed per value, matching C's "%f".
pub const FLOAT_PRECISION: usize = 6;

// Whether the binary calls a foreign `mll` symbol.
// True when the `extern-mll` Cargo feature is enabled.
pub const EXTERN_MLL: bool = cfg!(feature = "extern-mll");
