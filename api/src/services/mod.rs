//! Small stateful services that sit beside the telemetry core.

pub mod view_counter;
