pub mod render_gate;
pub mod session;
