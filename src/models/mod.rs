pub mod booking;
pub mod event;
pub mod mpesa_config;
pub mod payment;
pub mod session;

pub use booking::{parse_slot_time, Booking, BookingStatus, TimeInterval};
pub use event::PaymentSettled;
pub use mpesa_config::MpesaConfig;
pub use payment::{Payment, PaymentStatus, SettlementOutcome};
pub use session::{Actor, Role, Session};
