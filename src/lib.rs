pub mod accounts;

#[cfg(feature = "python")]
mod python;
