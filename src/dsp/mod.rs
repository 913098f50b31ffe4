pub mod detector;
pub mod framer;
pub mod loopsim;
pub mod notch;
pub mod persistence;
pub mod screening;
pub mod utils;

pub use detector::CandidateDetector;
pub use framer::SpectralFramer;
pub use loopsim::{simulate_feedback, HowlingSuppressor};
pub use notch::{FilterCascade, NotchSection};
pub use persistence::PersistenceTracker;
pub use screening::screen;
