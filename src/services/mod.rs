pub(crate) mod booking_store;
pub(crate) mod callback_service;
pub(crate) mod mpesa_service;
pub(crate) mod payment_service;

#[cfg(test)]
pub(crate) mod testing;
