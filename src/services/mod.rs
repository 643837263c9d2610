pub mod bookings;
pub mod events;
pub mod fees;
pub mod gateway;
pub mod lifecycle;
pub mod payments;
pub mod phone;
pub mod settlement;
pub mod slots;
pub mod transactions;
