mod error;
mod keyframe;
mod registry;
mod track;

pub use error::RegistryError;
pub use keyframe::{Interpolation, Keyframe};
pub use registry::{TrackHandle, TrackRegistry};
pub use track::Track;
