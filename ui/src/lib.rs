#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod console;
mod export;

use anyhow::Result;
use futures_channel::mpsc::UnboundedReceiver;
use futures_util::StreamExt;
use geom::LonLat;
use structopt::StructOpt;

use backend::{AgencyID, Gateway, HttpGateway, RouteID, TripID};
use tracker::{Config, Event, MemorySurface, Tracker};

use self::console::Console;

#[derive(StructOpt)]
struct Args {
    /// The base URL of the tracking backend
    #[structopt(long, default_value = "http://localhost:8080")]
    server: String,
    /// A JSON file overriding the default settings
    #[structopt(long)]
    config: Option<String>,
    /// Seconds between refreshes. Overrides the config file.
    #[structopt(long)]
    interval: Option<u64>,
    /// Pick this agency instead of waiting for a single agency to be picked automatically
    #[structopt(long)]
    agency: Option<i64>,
    #[structopt(long)]
    route: Option<i64>,
    /// Start tracking this trip. Requires --route.
    #[structopt(long)]
    trip: Option<String>,
    /// After tracking starts, set the rider's location to the stop with this sequence
    #[structopt(long)]
    station: Option<i64>,
    /// When tracking stops, write everything on the map to this GeoJSON file
    #[structopt(long)]
    geojson: Option<String>,
    /// Print every route of the backend, including ones with nothing running, and exit
    #[structopt(long)]
    list_routes: bool,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(secs) = self.interval {
            config.update_interval_secs = secs;
        }
        Ok(config)
    }
}

pub fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Couldn't start the runtime: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = runtime.block_on(run(args)) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if args.trip.is_some() && args.route.is_none() {
        bail!("--trip needs --route");
    }
    if args.station.is_some() && args.trip.is_none() {
        bail!("--station needs --trip");
    }
    let config = args.config()?;

    let gateway = HttpGateway::new(&args.server);
    if args.list_routes {
        for line in console::describe_routes(&gateway.routes().await?) {
            println!("{line}");
        }
        return Ok(());
    }

    let (emitter, rx) = tracker::channel();
    let printer = tokio::spawn(print_events(rx));

    let surface = MemorySurface::new(
        LonLat::new(config.map_center.1, config.map_center.0),
        config.map_zoom,
    );
    let mut tracker = Tracker::new(gateway, surface, config, emitter);
    tracker.spawn_status_poll();

    tracker.load_agencies().await;
    if let Some(agency) = args.agency {
        tracker.select_agency(Some(AgencyID(agency))).await;
    }
    if let Some(route) = args.route {
        tracker.select_route(Some(RouteID(route))).await;
    }
    if let Some(ref trip) = args.trip {
        tracker.select_trip(Some(TripID::new(trip.clone())));
        if !tracker.start_tracking().await {
            bail!("Couldn't start tracking {trip}");
        }
        match tracker.gateway().selected_trip().await {
            Ok(selected) => info!("Backend is tracking {}", selected.trim()),
            Err(err) => warn!("Couldn't confirm the selected trip: {err}"),
        }
        if let Some(sequence) = args.station {
            pick_station(&mut tracker, sequence).await?;
        }

        info!("Tracking until interrupted");
        tokio::signal::ctrl_c().await?;
        if let Some(ref path) = args.geojson {
            export::write_geojson(tracker.map().lock().await.surface(), path)?;
        }
        tracker.stop_tracking().await;
    }

    // Closes the event channel once the timers are gone
    drop(tracker);
    printer.await?;
    Ok(())
}

async fn pick_station(
    tracker: &mut Tracker<HttpGateway, MemorySurface>,
    sequence: i64,
) -> Result<()> {
    let stop = tracker
        .map()
        .lock()
        .await
        .path()
        .iter()
        .find(|s| s.sequence == sequence)
        .cloned();
    let Some(stop) = stop else {
        bail!("No stop with sequence {sequence} on this trip");
    };
    tracker
        .select_station(stop.lat, stop.lon, &stop.name, stop.sequence)
        .await;
    Ok(())
}

async fn print_events(mut rx: UnboundedReceiver<Event>) {
    let mut console = Console::default();
    while let Some(ev) = rx.next().await {
        let now = chrono::Local::now().format("%H:%M:%S");
        for line in console.handle(ev) {
            println!("[{now}] {line}");
        }
    }
}
