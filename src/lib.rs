use std::io::Write;

use log::error;

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod logging;
pub mod pipeline;
pub mod renderers;
pub mod util;

pub use app::{Application, ApplicationContext, Root};
pub use config::{create_clap_command, AppConfig, DisplayTarget};
pub use crate::core::Color;
pub use error::{EngineError, Result};
pub use game::ShipGame;
pub use util::format_mat4;

use game::{ShipKind, TITLE};
use renderers::{Backend, HeadlessBackend, TerminalBackend, WindowBackend};

/// Opens the display `config` asks for and plays until the user quits.
pub fn run(config: &AppConfig) -> Result<()> {
    match config.target {
        DisplayTarget::Window => {
            let backend = WindowBackend::new(TITLE, config.width, config.height)?;
            run_game(backend, config)
        }
        DisplayTarget::Terminal => run_game(TerminalBackend::new()?, config),
        DisplayTarget::Headless => {
            let backend =
                HeadlessBackend::new(config.width, config.height).with_frame_limit(config.frames);
            run_game(backend, config)
        }
    }
}

fn run_game<B: Backend>(backend: B, config: &AppConfig) -> Result<()> {
    let mut ctx = ApplicationContext::init_app(TITLE, backend, config.resource_dirs.clone())?;
    let mut game = ShipGame::setup_with(ctx.root_mut(), ShipKind::Default, config.mesh.as_deref())?;
    ctx.start_rendering(&mut game)?;
    ctx.close_app()
}

/// Turns the outcome of a run into a process exit code, reporting a failure on
/// `stderr` once and in the log file.
pub fn exit_status(result: &Result<()>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!(target: logging::FILE_ONLY, "Error occurred during execution: {}", e);
            let _ = writeln!(stderr, "Error occurred during execution: {}", e);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    fn headless(extra: &[&str]) -> AppConfig {
        let args = [
            "ship_game", "--mode", "headless", "--frames", "2", "--width", "8", "--height", "8",
        ];
        let matches = create_clap_command()
            .try_get_matches_from(args.iter().chain(extra).copied())
            .unwrap();
        AppConfig::from_matches(&matches).unwrap()
    }

    #[test]
    fn clean_run_exits_zero_silently() {
        let result = run(&headless(&[]));
        let mut stderr = Vec::new();
        assert_eq!(exit_status(&result, &mut stderr), 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn missing_mesh_exits_one_with_a_single_line() {
        logging::capture::install();
        let result = run(&headless(&["--mesh", "nope.obj"]));
        assert!(matches!(result, Err(EngineError::MeshNotFound(_))));

        let mut stderr = Vec::new();
        assert_eq!(exit_status(&result, &mut stderr), 1);
        let printed = String::from_utf8(stderr).unwrap();
        assert!(printed.starts_with("Error occurred during execution: "));
        assert!(printed.contains("nope.obj"));
        assert_eq!(printed.lines().count(), 1);

        // the logged copy stays out of the stderr logger
        let message = printed.trim_end();
        assert_eq!(
            logging::capture::find(Level::Error, message).as_deref(),
            Some(logging::FILE_ONLY)
        );
    }
}
