use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};

use backend::{Agency, Route, StationView, Trip, TripID};

use crate::Reconciliation;

/// Everything the presentation layer needs to know about. The core never touches dropdowns or
/// banners directly; it describes what changed and the presentation layer draws it.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    AgenciesLoaded(Vec<Agency>),
    /// Back to the "First select an agency" placeholder
    RoutesReset,
    RoutesLoaded(Vec<Route>),
    /// Back to the "First select a route" placeholder
    TripsReset,
    TripsLoaded(Vec<Trip>),
    Controls(Controls),

    Status(StatusMessage),
    StatusHidden,
    /// The direction banner. None hides it.
    Direction(Option<String>),
    /// A trip was picked; the map should be brought into view.
    FocusMap,

    SessionStarted(TripID),
    SessionStopped,
    StopsRendered {
        stops: usize,
        terminal: Option<String>,
        bearing: Option<f64>,
    },
    VehiclesReconciled(Reconciliation),
    StationList(StationList),
    /// The station list item with this sequence should be highlighted, and no other.
    StationHighlighted(Option<i64>),
    /// The latest free-form status text from the backend
    StatusText(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

/// Which of the selection controls accept input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub route: bool,
    pub trip: bool,
    pub start: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StationList {
    Loaded(Vec<StationView>),
    Failed(String),
}

/// Hands events to the presentation layer. Cheap to clone; timer tasks each get their own.
#[derive(Clone)]
pub struct Emitter {
    tx: UnboundedSender<Event>,
}

pub fn channel() -> (Emitter, UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded();
    (Emitter { tx }, rx)
}

impl Emitter {
    pub fn emit(&self, event: Event) {
        if let Err(err) = self.tx.unbounded_send(event) {
            // Nobody is watching anymore. Not a problem for the core.
            debug!("Dropping {:?}", err.into_inner());
        }
    }

    pub fn status<S: Into<String>>(&self, kind: StatusKind, text: S) {
        self.emit(Event::Status(StatusMessage {
            kind,
            text: text.into(),
        }));
    }

    pub fn info<S: Into<String>>(&self, text: S) {
        self.status(StatusKind::Info, text);
    }

    pub fn success<S: Into<String>>(&self, text: S) {
        self.status(StatusKind::Success, text);
    }

    pub fn error<S: Into<String>>(&self, text: S) {
        let text = text.into();
        warn!("{text}");
        self.status(StatusKind::Error, text);
    }
}
