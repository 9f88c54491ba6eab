// Command-line front end for chartkit

use anyhow::{Context, Result};

use chartkit::{cli::run, config::load};

fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let (cfg, command) = load().context("Failed to load configuration")?;
    cfg.print_summary();

    let output = run(&cfg, command)?;
    println!("{}", output.render(cfg.format)?);
    Ok(())
}
