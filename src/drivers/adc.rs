// Pulsebeat - Pulse Sensor ADC Driver
//
// ADC1 oneshot read of the PPG sensor output via raw ESP-IDF calls, scaled to
// the 0..=255 sample range.

use crate::config::*;
use crate::events::RawSample;
use crate::sampler::{scale_reading, Sampler};

pub struct PulseAdc {
    handle: esp_idf_sys::adc_oneshot_unit_handle_t,
    channel: esp_idf_sys::adc_channel_t,
    last: RawSample,
}

// SAFETY: the oneshot unit handle is only ever used from the tick task that
// owns this driver.
unsafe impl Send for PulseAdc {}

impl PulseAdc {
    /// Configure ADC1 on the pulse sensor pin with 11 dB attenuation
    /// (0-3.3 V range) and 12-bit conversions.
    pub fn new() -> anyhow::Result<Self> {
        let channel = PIN_PULSE_ADC as esp_idf_sys::adc_channel_t; // GPIO4 = ADC1_CH4
        unsafe {
            let mut handle: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: esp_idf_sys::adc_unit_t_ADC_UNIT_1,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp_idf_sys::esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut handle))?;

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11,
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            esp_idf_sys::esp!(esp_idf_sys::adc_oneshot_config_channel(
                handle, channel, &chan_cfg
            ))?;

            log::info!("Pulse ADC initialised (ADC1 ch{}, 12-bit, 11 dB)", channel);
            Ok(Self {
                handle,
                channel,
                last: 0,
            })
        }
    }
}

impl Sampler for PulseAdc {
    /// A failed conversion repeats the previous sample so the tick stream
    /// stays continuous.
    fn read(&mut self) -> RawSample {
        let mut raw: i32 = 0;
        let ret = unsafe { esp_idf_sys::adc_oneshot_read(self.handle, self.channel, &mut raw) };
        if ret == esp_idf_sys::ESP_OK {
            self.last = scale_reading(raw.max(0) as u32, ADC_FULL_SCALE);
        }
        self.last
    }
}

impl Drop for PulseAdc {
    fn drop(&mut self) {
        unsafe {
            esp_idf_sys::adc_oneshot_del_unit(self.handle);
        }
    }
}
