pub mod appointment;
pub mod booking;
pub mod classification;
pub mod client;
pub mod lawyer;
pub mod practice;
pub mod slot;
