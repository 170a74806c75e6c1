use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use arcus_console::app::App;
use arcus_console::client::{SessionInfo, StaticResources, WsSession};
use arcus_console::components::PlaceSelector;
use arcus_console::config::Config;
use arcus_console::logging;
use arcus_console::prefs::Preferences;
use arcus_console::routing::{Route, Screen};
use arcus_console::scheduling;
use arcus_console::services::Services;

#[derive(Parser)]
#[command(name = "arcus-console")]
#[command(about = "Terminal console client for the Arcus smart-home platform")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Route to mount on startup (e.g. /promon/signup)
    #[arg(long)]
    route: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the places available to this session
    Places,

    /// List devices at the active place
    Devices,

    /// Show device schedules at the active place
    Schedules,

    /// Run the signup wizard
    Signup {
        /// Discard persisted progress and start over
        #[arg(long)]
        fresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none() || matches!(cli.command, Some(Commands::Signup { .. }));

    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Places) => {
            cmd_places(&config).await?;
        }
        Some(Commands::Devices) => {
            cmd_devices(&config).await?;
        }
        Some(Commands::Schedules) => {
            cmd_schedules(&config).await?;
        }
        Some(Commands::Signup { fresh }) => {
            run_tui(&config, Screen::Signup, fresh, logging_handle.log_file_path).await?;
        }
        None => {
            let screen = cli
                .route
                .as_deref()
                .and_then(|path| path.parse::<Route>().ok())
                .and_then(|route| route.screen())
                .unwrap_or(Screen::Dashboard);
            run_tui(&config, screen, false, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

/// Connect to the platform and build the service layer
async fn connect(config: &Config) -> Result<(Services, SessionInfo)> {
    let token = config.token()?;
    let session = WsSession::connect(&config.platform.ws_url, &token).await?;
    let info = session.info().clone();
    let services = Services::new(
        Arc::new(session),
        StaticResources::new(config.platform.resource_base_url.clone()),
    );
    Ok((services, info))
}

async fn run_tui(
    config: &Config,
    screen: Screen,
    fresh_signup: bool,
    log_file_path: Option<std::path::PathBuf>,
) -> Result<()> {
    let (services, info) = connect(config).await?;

    let mut app = App::new(config.clone(), services, &info, screen, fresh_signup);
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if log_path.exists() {
            if let Ok(metadata) = log_path.metadata() {
                if metadata.len() > 0 {
                    eprintln!("Session log: {}", log_path.display());
                }
            }
        }
    }

    result
}

async fn cmd_places(config: &Config) -> Result<()> {
    let (services, _info) = connect(config).await?;
    let places = services.session().list_available_places().await?;

    if places.is_empty() {
        println!("No places available");
        return Ok(());
    }

    let mut selector = PlaceSelector::new();
    selector.set_places(places);

    println!("Available places ({})", selector.places().len());
    println!("{}", "─".repeat(60));
    for place in selector.places() {
        let role = if place.role == "OWNER" { " (owner)" } else { "" };
        match &place.city {
            Some(city) => println!("{} — {}{}", place.name, city, role),
            None => println!("{}{}", place.name, role),
        }
    }

    Ok(())
}

/// The place the console should act on: the person's last-used place if
/// it's still available, else the first by name
async fn resolve_place(config: &Config, services: &Services, info: &SessionInfo) -> Result<String> {
    let places = services.session().list_available_places().await?;
    let mut selector = PlaceSelector::new();
    selector.set_places(places);

    let prefs = Preferences::load(config.preferences_path());
    let place_id = prefs
        .last_place(&info.person_id)
        .and_then(|id| {
            selector
                .places()
                .iter()
                .find(|p| p.place_id == id)
                .map(|p| p.place_id.clone())
        })
        .or_else(|| selector.places().first().map(|p| p.place_id.clone()));

    place_id.ok_or_else(|| anyhow::anyhow!("no places available for this session"))
}

async fn cmd_devices(config: &Config) -> Result<()> {
    let (services, info) = connect(config).await?;
    let place_id = resolve_place(config, &services, &info).await?;
    services.session().set_active_place(&place_id).await?;

    let devices = services.places().list_devices(&place_id).await?;
    if devices.is_empty() {
        println!("No devices at this place");
        return Ok(());
    }

    println!("Devices ({})", devices.len());
    println!("{}", "─".repeat(60));
    for device in &devices {
        let glyph = if device.online { "●" } else { "○" };
        match &device.product_name {
            Some(product) => println!("{} {} — {}", glyph, device.name, product),
            None => println!("{} {}", glyph, device.name),
        }
    }

    Ok(())
}

async fn cmd_schedules(config: &Config) -> Result<()> {
    let (services, info) = connect(config).await?;
    let place_id = resolve_place(config, &services, &info).await?;
    services.session().set_active_place(&place_id).await?;

    let schedulers = services.scheduler().list_schedulers(&place_id).await?;
    if schedulers.is_empty() {
        println!("No schedules configured");
        return Ok(());
    }

    let devices = services.places().list_devices(&place_id).await?;

    println!("Schedules ({})", schedulers.len());
    println!("{}", "─".repeat(60));
    for scheduler in &schedulers {
        let device = devices.iter().find(|d| d.address == scheduler.target);
        let name = device.map(|d| d.name.as_str()).unwrap_or(&scheduler.target);
        let group = device
            .and_then(|d| scheduling::schedulable(&d.capabilities))
            .map(|(_, commands)| commands.group)
            .unwrap_or("?");
        let next = scheduler.next_fire_time.as_deref().unwrap_or("—");
        println!("{} [{}] next {}", name, group, next);
        for command in &scheduler.commands {
            match scheduling::ScheduleEvent::from_attributes(command) {
                Ok(event) => println!("    {}", event.describe()),
                Err(e) => println!("    (unreadable command: {e})"),
            }
        }
    }

    Ok(())
}
