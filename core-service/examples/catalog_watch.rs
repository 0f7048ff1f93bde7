//! Boots the catalog from the environment and prints it on every change.
//!
//! ```sh
//! SUPABASE_URL=https://xyz.supabase.co SUPABASE_ANON_KEY=... \
//!     cargo run -p core-service --example catalog_watch
//! ```

use bridge_traits::time::LogLevel;
use core_catalog::ContentCache;
use core_runtime::config::CatalogConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_service::bootstrap_desktop;

fn print_catalog(cache: &ContentCache) {
    println!("-- {} films, {} series", cache.films.len(), cache.series.len());
    for film in &cache.films {
        println!("  [film]  {} {} ({})", film.id, film.title, film.year);
    }
    for series in &cache.series {
        println!(
            "  [serie] {} {} - {} episode(s)",
            series.item.id,
            series.item.title,
            series.episodes.len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default().with_level(LogLevel::Info))?;

    let config = CatalogConfig::from_env()?;
    let remote = config.remote.is_configured();
    let service = bootstrap_desktop(config).await?;

    print_catalog(&service.start().await);
    if !remote {
        println!("No remote configured; nothing to watch.");
        return Ok(());
    }

    let mut changes = service.changes();
    loop {
        tokio::select! {
            event = changes.recv() => {
                if event.is_err() {
                    break;
                }
                print_catalog(&service.get_content());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    service.shutdown();
    Ok(())
}
