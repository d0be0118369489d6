//! Wet Paint Engine
//!
//! Decides which track segments of a ride to recolour as its trains move, so
//! the track looks freshly painted behind (or ahead of) each train. The crate
//! holds the decision logic only; the host simulation is reached through the
//! [`RideHost`], [`TrackNetwork`], [`Painter`] and [`PaintStorage`] traits.

pub mod checker;
pub mod commands;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod host;
pub mod layout;
pub mod locator;
pub mod network;
pub mod painter;
pub mod position;
pub mod props;
pub mod sim;
pub mod store;
pub mod walker;

// Re-export commonly used types
pub use checker::{TrainSample, compute_tail, compute_train, evaluate, sample, should_recompute};
pub use commands::{ChangeKind, ConfigCommand, ConfigEvent};
pub use config::{ModeKind, PaintConfig, PaintMode};
pub use driver::{PaintDriver, TickReport, recolour_vehicles};
pub use error::{PaintError, StorageError};
pub use host::{CarId, CarSample, RideHost, RideId, TrainId};
pub use layout::{TrackLayout, TrackPiece};
pub use locator::locate;
pub use network::{ElementKind, TileElement, TrackCursor, TrackNetwork};
pub use painter::{
    ColourScheme, PaintTarget, PaintTargets, Painter, PainterError, VehicleScheme, dispatch_all,
    dispatch_target, vehicle_colour_plan,
};
pub use position::{Position, TileCoord, TrackType, TravelDirection};
pub use props::{
    Colour, ColourSet, EndRule, PaintEnd, PaintStart, PatternChoice, PatternValue, SegmentCount,
    SegmentSide, SetCount, SetSlot, StartRule, TailModeProps, TrackColourPart, TrackColours,
    TrainModeProps, TrainSetInfo, VehicleColourPart, VehicleColours,
};
pub use sim::{PaintCall, RecordingPainter, SimHost};
pub use store::{MemoryStorage, PaintStorage, StoredPaintConfig, load_all};
pub use walker::{
    Cursor, SegmentList, TrackSegment, nth_node_behind, segment_at, segment_type_at, try_walk_from,
    walk_from,
};
