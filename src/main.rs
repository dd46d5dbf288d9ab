use clap::Parser;
use people_page::{PeopleScrape, ScraperConfig, output};
use std::process;

mod args;
use args::{Args, apply_overrides};

#[tokio::main]
async fn main() {
    // Initialize logging, info by default so scroll progress is visible
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ScraperConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => fatal(e),
        },
        None => ScraperConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let format = config.output_format;
    let scrape = PeopleScrape::new(&args.company).with_config(config);

    let result = match &args.input_html {
        Some(path) => {
            ::log::info!("Extracting from saved page {}", path.display());
            match std::fs::read_to_string(path) {
                Ok(html) => scrape.run_offline(&html),
                Err(e) => Err(e.into()),
            }
        }
        None => {
            ::log::info!("Starting scrape for company: {}", args.company);
            scrape.run().await
        }
    };

    let doc = match result {
        Ok(doc) => doc,
        Err(e) => fatal(e),
    };

    if let Err(e) = output::emit(&doc, format, args.output.as_deref()) {
        fatal(e);
    }
}

fn fatal(error: people_page::ScrapeError) -> ! {
    ::log::error!("{}", error);
    process::exit(1);
}
