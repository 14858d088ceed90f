pub mod bouts;
pub mod health;
pub mod metrics;
pub mod offers;
pub mod webhook;
