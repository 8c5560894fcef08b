//! innkeep - guesthouse admin console.
//!
//! Binary entry point: parses the command line, loads configuration and
//! dispatches to the console handlers.

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use innkeep_api::HttpAdminApi;
use innkeep_console::{
    handlers::{self, rooms::RoomPatch},
    router::{self, AppState},
    Stdout,
};
use innkeep_core::{
    alert::{AlertTone, SilentSink, TerminalBell},
    auth::SessionGate,
    config::Config,
    domain::{AcType, RoomForm, RoomStatus, RoomType},
    notifier::{BookingNotifier, NotifierConfig},
    ports::{KeyValueStore, ToneSink},
    seen::SeenBookings,
    store::FileStore,
};

/// Admin console for a small guesthouse booking system.
#[derive(Parser, Debug)]
#[command(name = "innkeep", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in as the admin.
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Log out.
    Logout,
    /// Revenue, occupancy and room status summary.
    Dashboard,
    /// List bookings and check guests in or out.
    #[command(subcommand)]
    Bookings(BookingsCmd),
    /// Manage the room inventory.
    #[command(subcommand)]
    Rooms(RoomsCmd),
    /// Manage homepage banners.
    #[command(subcommand)]
    Banners(BannersCmd),
    /// Watch for new bookings and raise a notification for each.
    Watch,
}

#[derive(Subcommand, Debug)]
enum BookingsCmd {
    /// List bookings, optionally filtered by guest name or id.
    List {
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Check a guest in.
    CheckIn { id: String },
    /// Check a guest out.
    CheckOut { id: String },
    /// Open a WhatsApp chat with the guest.
    Contact { id: String },
}

#[derive(Subcommand, Debug)]
enum RoomsCmd {
    /// List rooms, optionally filtered by status.
    List {
        #[arg(long, short, value_parser = parse_room_status)]
        status: Option<RoomStatus>,
    },
    /// Add a room.
    Add(RoomArgs),
    /// Edit a room; only the given fields change.
    Edit {
        id: String,
        #[command(flatten)]
        fields: RoomEditArgs,
    },
    /// Set a room's status, or toggle Active/Inactive when none is given.
    Status {
        id: String,
        #[arg(value_parser = parse_room_status)]
        status: Option<RoomStatus>,
    },
    /// Delete a room.
    Delete {
        id: String,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct RoomArgs {
    #[arg(long)]
    number: String,
    #[arg(long = "type", default_value = "SINGLE", value_parser = parse_room_type)]
    room_type: RoomType,
    #[arg(long, default_value = "AC", value_parser = parse_ac_type)]
    ac: AcType,
    #[arg(long)]
    price: f64,
    #[arg(long, default_value = "ACTIVE", value_parser = parse_room_status)]
    status: RoomStatus,
    /// Room photo to upload.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RoomEditArgs {
    #[arg(long)]
    number: Option<String>,
    #[arg(long = "type", value_parser = parse_room_type)]
    room_type: Option<RoomType>,
    #[arg(long, value_parser = parse_ac_type)]
    ac: Option<AcType>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long, value_parser = parse_room_status)]
    status: Option<RoomStatus>,
    /// Replacement room photo.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum BannersCmd {
    /// Show the banner slots.
    Slots,
    /// Upload an image (or a video, MAIN only) into a slot.
    Upload { slot: String, file: PathBuf },
}

impl From<RoomArgs> for RoomForm {
    fn from(a: RoomArgs) -> Self {
        Self {
            room_number: a.number,
            room_type: a.room_type,
            ac_type: a.ac,
            price_per_night: a.price,
            status: a.status,
            image: a.image,
        }
    }
}

impl From<RoomEditArgs> for RoomPatch {
    fn from(a: RoomEditArgs) -> Self {
        Self {
            room_number: a.number,
            room_type: a.room_type,
            ac_type: a.ac,
            price_per_night: a.price,
            status: a.status,
            image: a.image,
        }
    }
}

fn parse_room_status(raw: &str) -> Result<RoomStatus, String> {
    RoomStatus::parse(raw)
        .filter(|_| !raw.trim().is_empty())
        .ok_or_else(|| format!("unknown status {raw:?} (ACTIVE, INACTIVE, MAINTENANCE)"))
}

fn parse_ac_type(raw: &str) -> Result<AcType, String> {
    AcType::parse(raw)
        .filter(|_| !raw.trim().is_empty())
        .ok_or_else(|| format!("unknown AC type {raw:?} (AC, NON_AC)"))
}

fn parse_room_type(raw: &str) -> Result<RoomType, String> {
    if raw.trim().is_empty() {
        return Err("room type must not be empty".to_string());
    }
    Ok(RoomType::parse(raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    innkeep_core::logging::init("innkeep")?;
    let cfg = Arc::new(Config::load()?);
    debug!(api = %cfg.api_base_url, state = %cfg.state_file.display(), "config loaded");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(cfg.state_file.clone()));
    let gate = SessionGate::from_config(store.clone(), &cfg);

    if let Commands::Login { username } = &cli.command {
        return login(&gate, username.clone());
    }
    gate.require()?;

    let api = Arc::new(HttpAdminApi::from_config(&cfg)?);
    let state = AppState {
        cfg: cfg.clone(),
        api: api.clone(),
        screen: Arc::new(Stdout),
    };

    match cli.command {
        Commands::Login { .. } => Ok(()),
        Commands::Logout => {
            gate.logout()?;
            state.screen.show("Logged out.");
            Ok(())
        }
        Commands::Dashboard => handlers::dashboard::show(&state).await,
        Commands::Bookings(cmd) => match cmd {
            BookingsCmd::List { search } => {
                handlers::bookings::list(&state, search.as_deref()).await
            }
            BookingsCmd::CheckIn { id } => handlers::bookings::check_in(&state, &id).await,
            BookingsCmd::CheckOut { id } => handlers::bookings::check_out(&state, &id).await,
            BookingsCmd::Contact { id } => handlers::bookings::contact(&state, &id).await,
        },
        Commands::Rooms(cmd) => match cmd {
            RoomsCmd::List { status } => handlers::rooms::list(&state, status).await,
            RoomsCmd::Add(args) => handlers::rooms::add(&state, args.into()).await,
            RoomsCmd::Edit { id, fields } => {
                handlers::rooms::edit(&state, &id, fields.into()).await
            }
            RoomsCmd::Status { id, status } => {
                handlers::rooms::set_status(&state, &id, status).await
            }
            RoomsCmd::Delete { id, yes } => handlers::rooms::delete(&state, &id, yes).await,
        },
        Commands::Banners(cmd) => match cmd {
            BannersCmd::Slots => {
                handlers::banners::slots(&state);
                Ok(())
            }
            BannersCmd::Upload { slot, file } => {
                handlers::banners::upload(&state, &slot, &file).await
            }
        },
        Commands::Watch => {
            let sink: Arc<dyn ToneSink> = if cfg.alert_sound {
                Arc::new(TerminalBell)
            } else {
                Arc::new(SilentSink)
            };
            let alert = Arc::new(AlertTone::new(sink, cfg.alert_pulse));
            let seen = SeenBookings::load(store.clone()).await;
            let notifier =
                BookingNotifier::new(api, seen, alert, NotifierConfig::from(cfg.as_ref()));
            let cancel = router::install_signal_handler();
            router::run_watch(&state, notifier, cancel).await
        }
    }
}

fn login(gate: &SessionGate, username: Option<String>) -> anyhow::Result<()> {
    let username = match username {
        Some(u) => u,
        None => {
            print!("Username: ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            std::io::stdin()
                .read_line(&mut line)
                .context("failed to read username")?;
            line.trim().to_string()
        }
    };
    let password = rpassword::prompt_password("Password: ").context("failed to read password")?;
    gate.login(&username, &password)?;
    println!("Welcome back, {username}.");
    Ok(())
}
