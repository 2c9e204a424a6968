use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::info;

use vet_scheduler::api::HttpClinicApi;
use vet_scheduler::auth::AuthContext;
use vet_scheduler::config::Config;
use vet_scheduler::display::{print_day_schedule, write_schedule_csv};
use vet_scheduler::models::Service;
use vet_scheduler::view::{ClientLookup, ScheduleView};
use vet_scheduler::web;

#[derive(Parser)]
#[command(name = "vet-scheduler", version, about = "Veterinary clinic appointment scheduling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the clinic API server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the agenda of a day
    Agenda {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        day: Option<NaiveDate>,
        #[arg(long)]
        api: Option<String>,
        /// Also write the day grid to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Book an appointment
    Book {
        /// Part of the client's name
        #[arg(long)]
        client: String,
        /// Name of one of the client's pets
        #[arg(long)]
        pet: String,
        #[arg(long)]
        day: NaiveDate,
        /// One of the clinic's slots, e.g. 09:30
        #[arg(long)]
        time: String,
        #[arg(long)]
        service: Service,
        #[arg(long)]
        api: Option<String>,
    },
    /// Move an appointment to another slot of its day
    Reschedule {
        id: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        service: Service,
        #[arg(long)]
        api: Option<String>,
    },
    /// Cancel an appointment
    Cancel {
        id: String,
        #[arg(long)]
        api: Option<String>,
    },
}

fn open_view(config: &Config, api_url: Option<String>, day: Option<NaiveDate>) -> ScheduleView<HttpClinicApi> {
    let url = api_url.unwrap_or_else(|| config.api_url.clone());
    let api = HttpClinicApi::new(url, AuthContext::new());
    let today = day.unwrap_or_else(|| Utc::now().with_timezone(&config.utc_offset).date_naive());
    ScheduleView::new(api, config.slots.clone(), config.utc_offset, today)
        .with_notification_ttl(config.notification_ttl)
}

fn report(view: &ScheduleView<HttpClinicApi>) {
    if let Some(notification) = view.notification() {
        println!("{}", notification.message);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            println!("Starting clinic API on port {}...", config.port);
            web::start_server(&config).await?;
        }
        Command::Agenda { day, api, csv } => {
            let mut view = open_view(&config, api, day);
            view.reload().await?;
            let schedule = view.day_schedule();
            print_day_schedule(&view.week(), &schedule);
            if let Some(path) = csv {
                write_schedule_csv(&schedule, &path)?;
                println!("Agenda saved to {}", path.display());
            }
        }
        Command::Book {
            client,
            pet,
            day,
            time,
            service,
            api,
        } => {
            let mut view = open_view(&config, api, Some(day));
            let mut lookup = ClientLookup::new();

            lookup.search(view.api(), &client).await?;
            let chosen = match lookup.suggestions() {
                [only] => only.clone(),
                [] => return Err(format!("no client matches '{client}'").into()),
                many => {
                    let names: Vec<_> = many.iter().map(|c| c.name.as_str()).collect();
                    return Err(format!("'{client}' matches several clients: {}", names.join(", ")).into());
                }
            };
            lookup.select_client(view.api(), chosen).await?;

            let pet_id = lookup
                .pets()
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(&pet))
                .map(|p| p.id.clone())
                .ok_or_else(|| format!("client has no pet named '{pet}'"))?;
            lookup.select_pet(&pet_id);

            let draft = lookup.draft(day, &time, service.as_str())?;
            info!("booking {} for {} on {} at {}", service, pet, day, time);
            let outcome = view.create(draft).await;
            report(&view);
            outcome?;
        }
        Command::Reschedule { id, time, service, api } => {
            let mut view = open_view(&config, api, None);
            view.reload().await?;
            let outcome = view.update(&id, &time, service.as_str()).await;
            report(&view);
            outcome?;
        }
        Command::Cancel { id, api } => {
            let mut view = open_view(&config, api, None);
            let outcome = view.delete(&id).await;
            report(&view);
            outcome?;
        }
    }

    Ok(())
}
