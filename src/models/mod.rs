pub mod credential;
pub mod day_summary;
pub mod history_entry;
pub mod settings;
pub mod status;
pub mod tracking_state;
