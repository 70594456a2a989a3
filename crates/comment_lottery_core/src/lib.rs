pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod link;
pub mod ports;
pub mod repository;
pub mod selection;
pub mod session;
pub mod spin;

pub use domain::{CommentEntry, CommentPool, VideoId, WheelSegment, Winner};
pub use error::{FetchError, LotteryError, SpinError};
pub use lifecycle::{Completion, FetchTicket, Generation, RequestLifecycle, RequestState, Submission};
pub use link::ParseError;
pub use ports::{CommentPage, CommentSource, PortError, PortResult, RandomSource, RawComment};
pub use repository::CommentRepository;
pub use selection::SelectionEngine;
pub use session::LotterySession;
pub use spin::{LotteryState, SpinCoordinator, SpinOutcome, SpinStart};
