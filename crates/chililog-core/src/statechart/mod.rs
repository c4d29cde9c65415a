// ── Navigation statechart ──
//
// Console screens as a state machine over (section, mode). `state` holds
// the pure transition table, `navigator` runs the entry and exit actions,
// `detail` derives the flags a detail view shows.

mod detail;
mod navigator;
mod state;

pub use detail::DetailController;
pub use navigator::Navigator;
pub use state::{Event, Mode, Section, State, TransitionContext, transition};
