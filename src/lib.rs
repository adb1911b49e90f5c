pub mod censoredstring;
pub mod configuration;
pub mod contact;
pub mod dispatch;
pub mod http;
pub mod startup;
pub mod telemetry;
pub mod workflow;
