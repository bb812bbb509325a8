//! Run one sync outside the server and print the result as JSON.
//!
//! `sync-once [keyword ...]`: with arguments, those keywords replace the
//! configured keyword source.
//!
//! The single-active-run guard lives inside the server process, so this
//! binary must not run while the server is up against the same quota file:
//! both would read the same count and each advance it on its own.

use anyhow::Context;
use keyword_post_sync::{bootstrap, config::SyncConfig, init_tracing, keywords::StaticKeywords};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = SyncConfig::from_env()?;
    let pipeline = bootstrap::build_pipeline(&cfg)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = if args.is_empty() {
        pipeline.run_once().await
    } else {
        let keywords = StaticKeywords::from_texts(args).into_keywords();
        pipeline.run_with_keywords(keywords).await
    }
    .context("sync run failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.success {
        std::process::exit(2);
    }
    Ok(())
}
