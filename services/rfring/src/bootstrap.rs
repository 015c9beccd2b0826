//! Service bootstrap
//!
//! Command-line parsing, the legacy positional debug flag, and logging setup.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{error::ErrorKind, Parser};
use tracing::{info, warn};

use common::logging::{self, LogConfig};

/// Command-line arguments for rfring
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rfring",
    version = env!("CARGO_PKG_VERSION"),
    about = "RF ring amplifier gateway",
    long_about = None
)]
pub struct Args {
    /// Log every generated PV name while building the tables ("true" to enable)
    #[arg(value_name = "SHOW_DEBUG_INFO", allow_hyphen_values = true)]
    pub show_debug: Option<OsString>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", env = "RF_RING_LOG_LEVEL")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Directory for daily log files (console only when unset)
    #[arg(long, env = "RF_RING_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Configuration file (toml, yaml or json)
    #[arg(short = 'c', long, env = "RF_RING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the PV tables as JSON and exit
    #[arg(long)]
    pub dump: bool,

    /// Run a single connection refresh and exit
    #[arg(long)]
    pub once: bool,

    /// Anything after the debug flag; its presence disables the flag
    #[arg(num_args = 1.., trailing_var_arg = true, hide = true)]
    pub extra: Vec<OsString>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            show_debug: None,
            log_level: "info".to_string(),
            no_color: false,
            log_dir: None,
            config: None,
            dump: false,
            once: false,
            extra: Vec::new(),
        }
    }
}

/// Parse the command line without ever rejecting it.
///
/// A command line clap cannot parse falls back to the defaults (plus the
/// `RF_RING_*` environment) and the rejection is handed back so it can be
/// logged once logging is up. Only help and version requests are `Err`.
pub fn parse_lenient<I, T>(argv: I) -> Result<(Args, Option<clap::Error>), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
        Ok(args) => Ok((args, None)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => Err(e),
        Err(e) => {
            let args = Args::try_parse_from([env!("CARGO_PKG_NAME")]).unwrap_or_default();
            Ok((args, Some(e)))
        },
    }
}

/// Interpret the positional debug flag.
///
/// Case-insensitive `true` enables it, `false` disables it. Anything else,
/// including an argument that is not valid UTF-8, disables it with a warning.
pub fn parse_debug_flag(raw: Option<&OsString>) -> bool {
    let Some(raw) = raw else {
        return false;
    };

    match raw.to_str() {
        Some(value) if value.eq_ignore_ascii_case("true") => true,
        Some(value) if value.eq_ignore_ascii_case("false") => false,
        Some(value) => {
            warn!("Parameter {} could not be converted to True/False", value);
            false
        },
        None => {
            warn!("Parameter {:?} could not be converted to True/False", raw);
            false
        },
    }
}

impl Args {
    /// Resolve and log the debug flag.
    ///
    /// The flag only counts when it is the sole positional parameter.
    pub fn show_debug_info(&self) -> bool {
        if !self.extra.is_empty() {
            warn!(
                "Parameters {:?} {:?} ignored, show debug info disabled",
                self.show_debug, self.extra
            );
            return false;
        }
        let show = parse_debug_flag(self.show_debug.as_ref());
        if self.show_debug.is_some() {
            info!("Show Debug Info {}", show);
        }
        show
    }
}

/// Initialize logging from the command-line arguments
pub fn initialize_logging(args: &Args) -> common::Result<()> {
    let config = LogConfig {
        service_name: "rfring".to_string(),
        log_dir: logging::resolve_log_dir(args.log_dir.as_deref()),
        console_level: logging::parse_level(&args.log_level),
        enable_ansi: !args.no_color,
        enable_json: false,
    };
    logging::init_with_config(config)
}
