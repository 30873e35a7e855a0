pub(crate) mod booking_handlers;
pub(crate) mod health;
pub(crate) mod mpesa_handlers;
