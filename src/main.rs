use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use manhwa_scraper::browser::{BrowserConfig, BrowserManager};
use manhwa_scraper::config::Config;
use manhwa_scraper::downloader::ChapterDownloader;
use manhwa_scraper::menu::Menu;
use manhwa_scraper::metrics::ScrapeMetrics;
use manhwa_scraper::sources::asurascans::AsuraScraper;
use std::io;
use std::thread;
use tokio::sync::oneshot;

const FALLBACK_PATTERN: &str = "{d(%H:%M:%S)} {h({l:<5})} {t} - {m}{n}";

/// Configure logging from log4rs.yml, or plain stderr output when it is unusable
fn init_logging() {
    let Err(file_error) = log4rs::init_file("log4rs.yml", Default::default()) else {
        return;
    };

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(FALLBACK_PATTERN)))
        .build();

    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info));

    match config.map(log4rs::init_config) {
        Ok(Ok(_)) => log::warn!("log4rs.yml not loaded ({}), logging to stderr", file_error),
        Ok(Err(e)) => eprintln!("Failed to install logger: {}", e),
        Err(e) => eprintln!("Failed to configure logging: {}", e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        log::error!("{}; using defaults", e);
        Config::default()
    });

    println!("  [*] Launching Chromium...");
    let manager = BrowserManager::new(BrowserConfig::from(&config.browser)).map_err(|e| {
        log::error!("Could not start Chromium: {}", e);
        e
    })?;
    let page = manager.new_page()?;

    let metrics = ScrapeMetrics::new();
    let scraper = AsuraScraper::new(page, &config, metrics.clone());
    let downloader = ChapterDownloader::new(&config, metrics.clone());

    // The menu blocks on stdin and Chrome, so it gets its own thread and
    // Ctrl-C is awaited here
    let (done_tx, done_rx) = oneshot::channel();
    thread::spawn(move || {
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .and_then(|runtime| {
                runtime.block_on(async move {
                    let mut menu = Menu::new(scraper, downloader, io::stdin().lock(), io::stdout());
                    menu.run().await
                })
            });
        let _ = done_tx.send(result);
    });

    tokio::select! {
        finished = done_rx => match finished {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("Menu stopped: {}", e),
            Err(_) => log::error!("Menu thread exited unexpectedly"),
        },
        _ = tokio::signal::ctrl_c() => {
            println!("\n\n  [*] Interrupted.");
            println!("\n{}", metrics.summary());
        }
    }

    drop(manager);
    println!("  [*] Browser closed.");
    Ok(())
}
