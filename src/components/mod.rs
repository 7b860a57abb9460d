pub mod control_panel;
pub mod detail_panel;
pub mod graph_view;
pub mod session;
