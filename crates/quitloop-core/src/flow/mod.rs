//! The urge intervention flow: step table, countdown and controller.

mod controller;
mod countdown;
pub mod presets;
mod session;
mod step;

pub use controller::FlowController;
pub use countdown::{Countdown, CountdownTick, CountdownToken};
pub use session::Session;
pub use step::{step_table, Step, StepSpec, Trigger};
