//! Quick-start examples for the Vidmill Rust SDK.
//!
//! Run with:
//!   VIDMILL_API_KEY=vm_live_... cargo run --example quickstart
//!
//! Or pass the key directly in code (not recommended for production).

use std::time::Duration;

use vidmill::{ClientBuilder, ConfigBuilder, WaitOptions};

#[tokio::main]
async fn main() -> vidmill::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Create a client (reads VIDMILL_API_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().build()?;

    // Or provide the key directly:
    // let client = Client::new("vm_live_abc123");

    // -----------------------------------------------------------------------
    // 2. Describe the encoding job as a config document
    // -----------------------------------------------------------------------
    let config = ConfigBuilder::new()
        .var("vid", 1234)
        .var("s3", "s3://accesskey:secretkey@my-bucket")
        .source("https://example.com/source/1234.mp4")
        .webhook("https://mysite.com/encoding-hook?vid=$vid")
        .output("mp4", "$s3/$vid.mp4")
        .output("webm", "$s3/$vid.webm")
        .output("jpg_300x", "$s3/$vid/thumb.jpg")
        .build()?;

    println!("submitting config:\n{config}\n");

    // -----------------------------------------------------------------------
    // 3. Submit and wait for completion, with a progress callback
    // -----------------------------------------------------------------------
    let opts = WaitOptions {
        poll_interval: Duration::from_secs(3),
        timeout: Duration::from_secs(600),
        on_progress: Some(Box::new(|job| {
            println!(
                "  status: {} ({})",
                job.status,
                job.progress.as_deref().unwrap_or("-")
            );
        })),
    };

    let job = client.encode(&config, Some(opts)).await?;

    println!("job {} completed!", job.id);
    if let Some(url) = job.output_url("mp4") {
        println!("mp4 written to {url}");
    }
    println!();

    // -----------------------------------------------------------------------
    // 4. Submit without waiting (fire-and-forget)
    // -----------------------------------------------------------------------
    let config = ConfigBuilder::new()
        .base_file("vidmill.conf")
        .var("vid", 5678)
        .source("https://example.com/source/5678.mp4")
        .build()?;

    let job = client.submit(&config).await?;
    println!("submitted! job ID: {} (status: {})", job.id, job.status);

    // Check it later:
    let job = client.get_job(job.id).await?;
    println!("current status: {}", job.status);
    if job.is_terminal() {
        println!(
            "job is done (complete={}, failed={})",
            job.is_complete(),
            job.is_failed()
        );
    }
    println!();

    // -----------------------------------------------------------------------
    // 5. Inspect probed media metadata
    // -----------------------------------------------------------------------
    if let Some(metadata) = client.get_all_metadata(job.id).await? {
        for target in metadata.targets() {
            println!("  {target}: {:?}", metadata.target(target));
        }
    }

    if let Some(source) = client.get_metadata_for(job.id, "source").await? {
        println!("source duration: {:?}", source.get("duration"));
    }

    Ok(())
}
