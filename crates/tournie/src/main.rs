use clap::Parser;
use tournie::{Bot, Config, ConfigError, Deps};
use tournie_core::Response;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let deps = Deps::in_memory(config.load_fixtures()?);
    let bot = Bot::new(&config.bot_config(), deps)?;

    match bot.handle(config.message()).await {
        Response::Text(text) => println!("{text}"),
        Response::Template(template) => println!("{}", serde_json::to_string_pretty(&template)?),
    }
    Ok(())
}
