use anyhow::{Context, Result};
use pipeline_notify::slack::HttpTransport;
use pipeline_notify::{log, notify, Config};

fn main() -> Result<()> {
    log::setup_logging();

    let transport = HttpTransport::new().context("Unable to build HTTP client")?;

    let result = Config::from_env().and_then(|config| notify(&config, &transport));

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }

    println!("Successfully sent the message!");
    Ok(())
}
