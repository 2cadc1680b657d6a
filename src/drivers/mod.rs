pub mod log_transport;
pub mod simu;

#[cfg(target_os = "espidf")]
pub mod adc;
#[cfg(target_os = "espidf")]
pub mod led;
