use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use crate::error::{EngineError, Result};

/// Where frames are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Window,
    Terminal,
    Headless,
}

/// Everything the command line decides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub target: DisplayTarget,
    pub width: usize,
    pub height: usize,
    /// Replaces the ship's mesh
    pub mesh: Option<String>,
    /// Searched in order when a mesh isn't built in. Always starts with the
    /// current directory.
    pub resource_dirs: Vec<PathBuf>,
    /// Headless only: stop after this many frames
    pub frames: u64,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

pub fn create_clap_command() -> Command {
    Command::new("ship_game")
        .about("A single ship in a single scene, turned with the keyboard")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Where to draw: 'window', 'terminal' or 'headless' ('v', 't', 'h')")
                .default_value("window")
                .value_parser(["window", "terminal", "headless", "v", "t", "h"]),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_name("PIXELS")
                .help("Window or headless frame width")
                .default_value("800")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_name("PIXELS")
                .help("Window or headless frame height")
                .default_value("600")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("mesh")
                .long("mesh")
                .value_name("FILE")
                .help("An .obj file to fly instead of the built in ship"),
        )
        .arg(
            Arg::new("resources")
                .long("resources")
                .value_name("DIR")
                .help("Extra directory to look for meshes in, may be repeated")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("frames")
                .long("frames")
                .value_name("N")
                .help("Frames to render in headless mode before exiting")
                .default_value("600")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .default_value("ship_game.log")
                .value_parser(value_parser!(PathBuf)),
        )
}

impl AppConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mode = matches
            .get_one::<String>("mode")
            .map(|s| s.as_str())
            .unwrap_or("window");
        let target = match mode {
            "window" | "v" => DisplayTarget::Window,
            "terminal" | "t" => DisplayTarget::Terminal,
            "headless" | "h" => DisplayTarget::Headless,
            other => return Err(EngineError::Cli(format!("unknown mode '{other}'"))),
        };

        let width = matches.get_one::<usize>("width").copied().unwrap_or(800);
        let height = matches.get_one::<usize>("height").copied().unwrap_or(600);
        if width == 0 || height == 0 {
            return Err(EngineError::Cli(format!(
                "frame size must be positive, got {width}x{height}"
            )));
        }

        let mut resource_dirs = vec![PathBuf::from(".")];
        if let Some(dirs) = matches.get_many::<PathBuf>("resources") {
            resource_dirs.extend(dirs.cloned());
        }

        let level = matches
            .get_one::<String>("log-level")
            .map(|s| s.as_str())
            .unwrap_or("info");
        let log_level = level
            .parse::<LevelFilter>()
            .map_err(|_| EngineError::Cli(format!("unknown log level '{level}'")))?;

        Ok(Self {
            target,
            width,
            height,
            mesh: matches.get_one::<String>("mesh").cloned(),
            resource_dirs,
            frames: matches.get_one::<u64>("frames").copied().unwrap_or(600),
            log_level,
            log_file: matches
                .get_one::<PathBuf>("log-file")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("ship_game.log")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig> {
        let matches = create_clap_command()
            .try_get_matches_from(std::iter::once("ship_game").chain(args.iter().copied()))
            .map_err(|e| EngineError::Cli(e.to_string()))?;
        AppConfig::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let cfg = parse(&[]).unwrap();
        assert_eq!(cfg.target, DisplayTarget::Window);
        assert_eq!((cfg.width, cfg.height), (800, 600));
        assert_eq!(cfg.mesh, None);
        assert_eq!(cfg.resource_dirs, vec![PathBuf::from(".")]);
        assert_eq!(cfg.frames, 600);
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert_eq!(cfg.log_file, PathBuf::from("ship_game.log"));
    }

    #[test]
    fn short_modes_and_repeated_resources() {
        let cfg = parse(&[
            "-m", "h", "--resources", "assets", "--resources", "more", "--frames", "10",
            "--log-level", "debug", "--mesh", "fighter.obj",
        ])
        .unwrap();
        assert_eq!(cfg.target, DisplayTarget::Headless);
        assert_eq!(
            cfg.resource_dirs,
            vec![PathBuf::from("."), PathBuf::from("assets"), PathBuf::from("more")]
        );
        assert_eq!(cfg.frames, 10);
        assert_eq!(cfg.log_level, LevelFilter::Debug);
        assert_eq!(cfg.mesh.as_deref(), Some("fighter.obj"));

        assert_eq!(parse(&["--mode", "t"]).unwrap().target, DisplayTarget::Terminal);
        assert_eq!(parse(&["-m", "v"]).unwrap().target, DisplayTarget::Window);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(parse(&["--mode", "vr"]), Err(EngineError::Cli(_))));
        assert!(matches!(parse(&["--width", "wide"]), Err(EngineError::Cli(_))));
        assert!(matches!(parse(&["--width", "0"]), Err(EngineError::Cli(_))));
        assert!(matches!(parse(&["--log-level", "loud"]), Err(EngineError::Cli(_))));
    }
}
