//! Paleo fascicolo downloader CLI
//!
//! Downloads every document of the configured fascicolo into the output
//! directory. Configuration comes from PALEO_* environment variables,
//! optionally seeded from a dotenv file.
//!
//! Usage:
//!   cargo run --bin paleo_cli -- download-fascicolo
//!
//!   # explicit dotenv file and output directory
//!   cargo run --bin paleo_cli -- --env-file paleo.env \
//!     download-fascicolo --output-dir ./archivio
//!
//!   # vendor's technical manual for the WS interface (no credentials)
//!   cargo run --bin paleo_cli -- fetch-manual
//!
//! Set RUST_LOG=paleo_download=debug to watch resolution and transport
//! details.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;

use paleo_download::{DocumentReference, PaleoClient, PaleoConfig, RemoteCall, DEFAULT_ENV_FILE};

/// Published location of the vendor's technical manual PDF.
const MANUAL_URL: &str = "https://paleodownload.regione.marche.it/PaleoWebService/PaleoWS_Versione5_AGID/ManualeTecnico/WSPaleoVer5.12-Agid.pdf";

const MANUAL_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "paleo_cli")]
#[command(about = "Scarica i documenti di un fascicolo Paleo")]
struct Args {
    /// Dotenv file to seed the environment from
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scarica tutti i documenti del fascicolo
    DownloadFascicolo {
        /// Override PALEO_OUTPUT_DIR for this run
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Scarica il manuale tecnico del servizio
    FetchManual {
        /// Directory to save the PDF into
        #[arg(long, default_value = "docs")]
        target_dir: PathBuf,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "ERROR:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::DownloadFascicolo { output_dir } => {
            let mut config = PaleoConfig::from_env_path(&args.env_file)?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let client = PaleoClient::connect(&config)?;
            download_fascicolo(&client, &config)
        }
        Command::FetchManual { target_dir } => fetch_manual(&target_dir),
    }
}

fn download_fascicolo<G: RemoteCall>(
    client: &PaleoClient<G>,
    config: &PaleoConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} fascicolo {} ({} / {})",
        "Connesso:".green().bold(),
        config.fascicolo_id.yellow(),
        client.list_operation_name(),
        client.download_operation_name()
    );

    fs::create_dir_all(&config.output_dir)?;

    let documents = client.list_documents()?;
    if documents.is_empty() {
        println!(
            "{} nessun documento trovato per il fascicolo indicato",
            "WARNING:".yellow()
        );
        return Ok(());
    }
    println!(
        "{} {} documenti",
        "Trovati:".green().bold(),
        documents.len()
    );

    for document in &documents {
        let content = client.download_document(document)?;
        let target = config.output_dir.join(safe_filename(document));
        fs::write(&target, &content)?;
        println!("{} {}", "Scaricato:".green(), target.display());
    }
    Ok(())
}

// The manual is a public static file; no credentials, no WSDL.
fn fetch_manual(target_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let filename = MANUAL_URL.rsplit('/').next().unwrap_or("manuale.pdf");
    let target = target_dir.join(filename);
    fs::create_dir_all(target_dir)?;

    let http = reqwest::blocking::Client::builder()
        .timeout(MANUAL_TIMEOUT)
        .build()?;
    let response = http.get(MANUAL_URL).send()?.error_for_status()?;
    fs::write(&target, response.bytes()?)?;
    println!("{} {}", "Manuale salvato in:".green(), target.display());
    Ok(())
}

// Filenames come from the remote listing; keep only the final path
// component so a hostile or sloppy entry cannot escape the output
// directory.
fn safe_filename(document: &DocumentReference) -> String {
    let base = document
        .filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();
    if base.is_empty() || base == "." || base == ".." {
        format!("documento_{}.bin", document.document_id)
    } else {
        base.to_string()
    }
}
