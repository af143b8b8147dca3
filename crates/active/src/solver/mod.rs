mod learner_impl;
mod learner_solver;
mod learner_state;

pub use learner_impl::*;
pub use learner_solver::*;
pub use learner_state::*;
