use clap::{Args, Parser, Subcommand};
use dks_checkin_cli::infrastructure::{ScannerArgs, StoreArgs};
use dks_checkin_cli::presentation::console::render_cameras;
use dks_checkin_cli::{CliCamera, LogConfig, Result, StaffConsole};
use dks_checkin_core::{ActivationType, CameraSourceManager, CommitPolicy, ScanOutcome};
use dks_checkin_store::PostgrestParticipantStore;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(name = "dks-checkin")]
#[command(
    version,
    about = "DKS Festival check-in - verify and redeem activation rights from participant QR codes"
)]
struct Cli {
    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LoggingArgs {
    /// Debug logging with thread ids
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level for workspace crates (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value_t = tracing::Level::WARN)]
    log_level: tracing::Level,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<String>,
}

impl LoggingArgs {
    fn config(&self) -> LogConfig {
        let mut config = if self.verbose {
            LogConfig::dev()
        } else {
            LogConfig::default().with_level(self.log_level)
        };
        if self.log_json {
            config = config.with_json();
        }
        if let Some(path) = &self.log_file {
            config = config.with_file_output(path.clone());
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the staff check-in console
    Scan {
        /// Skip the menu and start with this activation (dice, puzzle)
        #[arg(short, long)]
        activation: Option<ActivationType>,

        /// Camera id to open instead of the default
        #[arg(long)]
        camera: Option<String>,

        /// Print outcomes as JSON lines on stdout
        #[arg(long)]
        json: bool,

        /// Exit after the first outcome
        #[arg(long)]
        once: bool,

        #[command(flatten)]
        scanner: ScannerArgs,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List cameras; the default pick is marked with *
    Cameras {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        scanner: ScannerArgs,
    },

    /// Print the JSON schema of a scan outcome
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.config().init()?;

    match cli.command {
        Commands::Scan {
            activation,
            camera,
            json,
            once,
            scanner,
            store,
        } => {
            scan(activation, camera, json, once, &scanner, &store).await?;
        }
        Commands::Cameras { json, scanner } => list_cameras(json, &scanner).await?,
        Commands::Schema => {
            let schema = schemars::schema_for!(ScanOutcome);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

async fn scan(
    activation: Option<ActivationType>,
    camera: Option<String>,
    json: bool,
    once: bool,
    scanner: &ScannerArgs,
    store_args: &StoreArgs,
) -> Result<()> {
    let config = store_args.resolve()?;
    info!("Using store {} (table {})", config.base_url, config.table);

    let store = PostgrestParticipantStore::new(&config)?;
    let policy = if store.conditional_commit() {
        CommitPolicy::Conditional
    } else {
        CommitPolicy::Unconditional
    };

    let platform = CliCamera::from_args(scanner);
    let manual = platform.manual().cloned();

    let mut app = StaffConsole::new(
        platform,
        store,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    )
    .with_sampling(scanner.sampling())
    .with_commit_policy(policy)
    .with_manual_entry(manual)
    .with_camera(camera)
    .with_json(json)
    .once(once);

    app.run(activation).await?;
    Ok(())
}

async fn list_cameras(json: bool, scanner: &ScannerArgs) -> Result<()> {
    let mut cameras = CameraSourceManager::new(CliCamera::from_args(scanner));
    let listed = cameras.list_cameras().await.map(<[_]>::len);

    if json {
        println!("{}", serde_json::to_string_pretty(cameras.devices())?);
        listed?;
        return Ok(());
    }

    let default_id = cameras.default_camera().map(|device| device.id.as_str());
    println!("{}", render_cameras(cameras.devices(), default_id));
    listed?;
    Ok(())
}
