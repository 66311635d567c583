//! Data models for the De Olho na Fila feed

pub mod lenient;
pub mod unit;

pub use unit::{NormalizedUnit, QueueUnit, VaccineAvailability};
