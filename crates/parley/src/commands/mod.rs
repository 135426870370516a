//! Commands shipped with the router.

mod echo;
mod help;

pub use self::echo::register_echo;
pub use self::help::{register_help, render_catalog, render_command, render_unknown};
