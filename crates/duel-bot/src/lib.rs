pub mod planner;
pub mod policy;

pub use planner::PlannerConfig;
pub use policy::BotPlayer;
