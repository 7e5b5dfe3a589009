// Logging setup and the terminal error path
//
// Setup errors are never recovered from: the user gets one message (native
// dialog on Windows, stderr elsewhere) and the process exits with status 1.

use crate::config::Config;
use crate::error::SetupError;

/// Initialize env_logger; `RUST_LOG` overrides the configured level
pub fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(config.log_level());
    builder.parse_default_env();
    builder.init();
}

/// The text shown to the user: the setup error if there is one in the
/// chain, otherwise the whole chain on one line
pub fn user_message(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SetupError>())
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("{:#}", err))
}

/// Report a fatal error and terminate the process
pub fn exit_on_error(title: &str, err: &anyhow::Error) -> ! {
    log::error!("{:?}", err);
    show_message(title, &user_message(err));
    std::process::exit(1)
}

#[cfg(windows)]
fn show_message(title: &str, message: &str) {
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

#[cfg(not(windows))]
fn show_message(_title: &str, message: &str) {
    eprintln!("{}", message);
}
