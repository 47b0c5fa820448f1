//! Background tasks

pub mod corte;

pub use corte::spawn_corte_scheduler;
