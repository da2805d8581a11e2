use anyhow::Result;
use env_logger::Env;
use roomcraft::cli::interface::run_cli_interface;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    run_cli_interface().await?;
    Ok(())
}
