pub mod channel_status;
pub mod directions_resolved;
pub mod map_click;
pub mod map_ready;
pub mod position_insert;
pub mod role_activated;
