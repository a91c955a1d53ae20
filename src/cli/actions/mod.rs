pub mod server;

use crate::cli::settings::Settings;

#[derive(Debug)]
pub enum Action {
    Server { settings: Settings },
}
