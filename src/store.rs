use crate::models::{Booking, Payment, PaymentStatus};

/// Bookings and payments held for the lifetime of the process.
#[derive(Debug, Default)]
pub struct Store {
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
}

impl Store {
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn booking(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn booking_mut(&mut self, id: &str) -> Option<&mut Booking> {
        self.bookings.iter_mut().find(|b| b.id == id)
    }

    pub fn insert_booking(&mut self, booking: Booking) {
        self.bookings.push(booking);
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn payment(&self, id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn payment_mut(&mut self, id: &str) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| p.id == id)
    }

    pub fn insert_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
    }

    /// A pending or completed payment blocks another one for the same booking.
    pub fn open_payment_for(&self, booking_id: &str) -> Option<&Payment> {
        self.payments
            .iter()
            .find(|p| p.booking_id == booking_id && p.status != PaymentStatus::Failed)
    }
}
