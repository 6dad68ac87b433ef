//! Transmitter trait - per-sink delivery interface
//!
//! Defines the abstract interface every sink variant implements.

use crate::{Batch, DeliveryError};

/// Batch delivery trait
///
/// Implementations serialize each event of the batch and deliver the whole
/// batch to one destination. They hold no engine state.
#[trait_variant::make(Transmitter: Send)]
pub trait LocalTransmitter {
    /// Transmitter name (used for logging)
    fn name(&self) -> &str;

    /// Deliver one batch
    ///
    /// # Errors
    /// Returns the delivery failure; the batch is not retried
    async fn transmit(&self, batch: &Batch) -> Result<(), DeliveryError>;
}
