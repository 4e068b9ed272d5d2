pub mod alert_statuses;
pub mod countries;
pub mod editions;
pub mod health;
