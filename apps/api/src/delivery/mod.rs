// Outbound delivery of rendered reports.

pub mod discord;
