pub mod remove_objective_s2c;
pub mod set_display_objective_s2c;
pub mod set_score_s2c;

pub use remove_objective_s2c::RemoveObjectiveS2c;
pub use set_display_objective_s2c::SetDisplayObjectiveS2c;
pub use set_score_s2c::SetScoreS2c;
