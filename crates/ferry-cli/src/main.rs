//! Multipart upload CLI for a remote storage worker.

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use ferry_client::{HttpWorkerClient, UploadCoordinator, reader};
use ferry_signer::TokenIssuer;
use settings::{DEFAULT_CONFIG_FILE, format_bytes, load_config, write_sample_config};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Multipart file upload client for a remote storage worker")]
#[command(version)]
struct Cli {
    /// File to upload
    file: PathBuf,

    /// Stable resource name for the uploaded file
    resource: String,

    /// Config file path
    #[arg(long, env = "FERRY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Upload failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if !config_path.exists() {
        write_sample_config(&config_path).await?;
        eprintln!("Sample configuration created: {}", config_path.display());
        anyhow::bail!(
            "configuration file {} not found; edit the sample with your worker URL and secret, then retry",
            config_path.display()
        );
    }

    let config = load_config(&config_path)?;
    let issuer =
        TokenIssuer::new(&config.jwt_secret).context("failed to initialize token signer")?;
    let worker = HttpWorkerClient::new(config.base_url(), config.request_timeout())?;

    let info = reader::probe(&cli.file).await?;
    println!("File: {}", cli.file.display());
    println!("Size: {} bytes ({})", info.size, format_bytes(info.size));
    println!("MIME type: {}", info.mime_type);
    println!("Uploading as '{}'...", cli.resource);

    let coordinator = UploadCoordinator::new(worker, issuer).on_progress(|part| {
        println!(
            "Part {} uploaded: {:.1}% ({}/{} bytes)",
            part.part_number,
            part.percent(),
            part.uploaded_bytes,
            part.total_bytes
        );
    });

    let report = tokio::select! {
        result = coordinator.upload(&cli.file, &cli.resource) => result?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nUpload cancelled by user");
            std::process::exit(1);
        }
    };

    let file_url = format!("{}/file/{}", config.base_url(), report.resource_id);
    println!("\nUpload successful!");
    println!("Resource name: {}", report.resource_id);
    println!("File URL: {file_url}");
    println!("ETag: {}", report.manifest.etag);
    println!("Size: {} bytes", report.manifest.size);
    println!("Upload time: {:.2} seconds", report.elapsed.as_secs_f64());
    println!(
        "Average speed: {}/s",
        format_bytes(report.bytes_per_sec() as u64)
    );

    Ok(())
}
