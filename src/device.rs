//! Choice of the compute device.

use candle_core::Device;

/// First cuda device if there is one (and the crate was built with the cuda feature), cpu otherwise.
/// The absence of an accelerator is not an error.
pub fn select_device() -> Device {
    match Device::cuda_if_available(0) {
        Ok(device) => {
            if device.is_cuda() {
                log::info!("using cuda device 0");
            } else {
                log::info!("no accelerator found, using cpu");
            }
            device
        }
        Err(e) => {
            log::warn!("accelerator could not be initialized ({}), falling back to cpu", e);
            Device::Cpu
        }
    }
} // end of select_device

#[cfg(test)]
mod tests {

    use super::*;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn a_device_is_always_selected() {
        log_init_test();
        let device = select_device();
        #[cfg(not(feature = "cuda"))]
        assert!(device.is_cpu());
        let _ = device;
    }
}
