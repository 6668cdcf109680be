pub mod app;
mod center_panel;
mod left_panel;
mod right_panel;
