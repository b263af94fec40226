//! Takt plan scheduling.
//!
//! The pipeline is leaf-first: [`calendar`] arithmetic, [`phase`]
//! classification, per-group [`grid`] generation and [`validator`] checks,
//! merged by the [`assembler`]. [`views`] derives read-side data from stored
//! plans.

pub mod assembler;
pub mod calendar;
pub mod grid;
pub mod model;
pub mod phase;
pub mod validator;
pub mod views;

pub use assembler::{PlanAssembler, PlanStore, ProjectSource, SchedulerDefaults};
pub use calendar::WorkWeek;
pub use model::{
    AssignmentStatus, Location, PhaseGroup, PhaseHint, PlanHeader, PlanStatus, PlanWarnings,
    Project, TaktPlan, Trade,
};
pub use views::{Flowline, PlanSummary, plan_flowline, plan_summary};
