pub mod time;
pub mod key;
pub mod curve;
pub mod binding;
pub mod stack;

pub use time::{Ticks, TimeMode, TimeSpan, TICKS_PER_SECOND, seconds_to_ticks, ticks_to_seconds};
pub use key::{AnimCurveKey, DataIndex, Interpolation, KeyFlags};
pub use curve::{AnimCurve, AnimCurve3};
pub use binding::AnimNode;
pub use stack::{AnimLayer, AnimStack};
