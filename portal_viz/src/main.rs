//! portal_viz: interactive entry point.

use std::path::PathBuf;

use log::{error, info};

use portal_viz::app::{run, AppConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Portal - two-hand circle gesture visualizer           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware available (set \"use_leap\" in config)");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse/keyboard simulation  (use --features leap for hardware)");
    println!();

    let cfg = match config_from_args(std::env::args().skip(1)) {
        Ok(cfg) => cfg,
        Err(e)  => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    info!("opening visualizer window");

    if let Err(e) = run(cfg) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// `--quick` (or no arguments) → defaults; `--config <file.json>` → load.
fn config_from_args(mut args: impl Iterator<Item = String>) -> Result<AppConfig, String> {
    let mut path: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quick" => {}
            "--config" => match args.next() {
                Some(p) => path = Some(PathBuf::from(p)),
                None    => return Err("--config needs a file path".into()),
            },
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }

    match path {
        Some(p) => {
            info!("loading config from {}", p.display());
            AppConfig::from_json_file(&p).map_err(|e| e.to_string())
        }
        None => Ok(AppConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn quick_and_no_args_use_defaults() {
        assert_eq!(config_from_args(args(&[])).unwrap(), AppConfig::default());
        assert_eq!(config_from_args(args(&["--quick"])).unwrap(), AppConfig::default());
    }

    #[test]
    fn config_flag_needs_a_path() {
        let err = config_from_args(args(&["--config"])).unwrap_err();
        assert!(err.contains("--config"), "{}", err);
    }

    #[test]
    fn unknown_argument_is_rejected() {
        let err = config_from_args(args(&["--quick", "--fast"])).unwrap_err();
        assert!(err.contains("--fast"), "{}", err);
    }

    #[test]
    fn config_flag_loads_file() {
        let path = std::env::temp_dir().join(format!("portal_viz_args_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "spark_count": 12 }"#).unwrap();
        let cfg = config_from_args(args(&["--config", path.to_str().unwrap()]));
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.unwrap().spark_count, 12);

        let missing = config_from_args(args(&["--config", "/nonexistent/portal.json"]));
        assert!(missing.is_err());
    }
}
