use std::io;
use std::process::ExitCode;

use log::info;
use ship_game::{create_clap_command, exit_status, logging, AppConfig};

fn main() -> ExitCode {
    let matches = create_clap_command().get_matches();

    let result = AppConfig::from_matches(&matches).and_then(|config| {
        logging::init(config.target, config.log_level, &config.log_file)?;
        info!("{:?}", config);
        ship_game::run(&config)
    });

    ExitCode::from(exit_status(&result, &mut io::stderr()))
}
