use std::path::PathBuf;
use std::process;

use canvas_bridge::prelude::*;
use clap::{Parser, ValueEnum};

mod orbit_engine;
use orbit_engine::OrbitEngine;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum EngineKind {
    /// In-process CPU renderer.
    Demo,
    /// Script-driven WebGL2 canvas in a child web view process.
    WebView,
}

/// Runs an embedded engine behind a native window.
#[derive(Debug, Parser)]
#[command(name = "playground", version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = EngineKind::Demo)]
    engine: EngineKind,

    /// Engine script, loaded in the order given. Replaces the configured
    /// scripts.
    #[arg(long = "script", value_name = "PATH")]
    scripts: Vec<PathBuf>,
}

fn main() {
    init_logger();

    let cli = Cli::parse();

    let mut config = BridgeConfig::discover(cli.config.as_deref())
        .unwrap_or_else(|err| {
            eprintln!("playground config failed: {}", err);
            process::exit(1);
        });

    if !cli.scripts.is_empty() {
        config.engine.scripts = cli.scripts;
    }

    if let Err(err) = launch(cli.engine, config) {
        eprintln!("playground failed: {}", err);
        process::exit(1);
    }
}

fn launch(kind: EngineKind, mut config: BridgeConfig) -> Result<(), BridgeError> {
    match kind {
        EngineKind::Demo => {
            info!("starting orbit demo");
            let (engine, ready) = OrbitEngine::launch();
            canvas_bridge::run(config, engine, ready)
        }
        EngineKind::WebView => {
            if config.engine.scripts.is_empty() {
                config.engine.scripts = vec![default_script()];
            }
            info!(
                "starting web view with {} script(s)",
                config.engine.scripts.len()
            );
            let (engine, ready) = WebViewEngine::launch(&config.engine)?;
            canvas_bridge::run(config, engine, ready)
        }
    }
}

fn default_script() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scripts")
        .join("game.js")
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scripts_are_repeatable_and_ordered() {
        let cli = Cli::parse_from([
            "playground",
            "--engine",
            "web-view",
            "--script",
            "a.js",
            "--script",
            "b.js",
        ]);

        assert_eq!(cli.engine, EngineKind::WebView);
        assert_eq!(
            cli.scripts,
            vec![PathBuf::from("a.js"), PathBuf::from("b.js")]
        );
    }

    #[test]
    fn demo_engine_is_the_default() {
        let cli = Cli::parse_from(["playground"]);
        assert_eq!(cli.engine, EngineKind::Demo);
        assert!(cli.config.is_none());
    }

    #[test]
    fn bundled_script_exists() {
        assert!(default_script().is_file());
    }

    #[test]
    fn bundled_config_points_at_bundled_script() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("config")
            .join("playground.yaml");

        let config = BridgeConfig::load(&path).expect("load playground config");

        assert_eq!(config.window.size(), SurfaceSize::new(800, 600));
        assert_eq!(config.engine.scripts.len(), 1);
        assert!(config.engine.scripts[0].is_file());
    }
}
