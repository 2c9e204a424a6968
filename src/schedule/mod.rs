pub mod types;
pub mod slot_utils;
pub mod week;
pub mod matcher;

pub use types::{DaySchedule, SlotRow};
pub use slot_utils::{SlotError, TimeSlots};
pub use week::{build_grid, SlotGrid, WeekWindow};
pub use matcher::{appointments_in_cell, day_schedule};
