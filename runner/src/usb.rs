use core::sync::atomic::{AtomicBool, Ordering};

use config::Mode;
use defmt::info;
use embassy_stm32::bind_interrupts;
use embassy_stm32::peripherals;
use embassy_stm32::usb;
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Handler, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(pub struct Irqs {
    OTG_HS => usb::InterruptHandler<peripherals::USB_OTG_HS>;
});

pub type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_HS>;

pub struct UsbHardware<'d> {
    pub driver: usb::Driver<'d, peripherals::USB_OTG_HS>,
    pub config_descriptor: &'d mut [u8; 256],
    pub bos_descriptor: &'d mut [u8; 32],
    pub control_buf: &'d mut [u8; 64],
}

pub static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
pub static BOS_DESCRIPTOR: StaticCell<[u8; 32]> = StaticCell::new();
pub static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
pub static EP_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();

#[macro_export]
macro_rules! get_usb_hardware {
    ($peripherals:ident) => {{
        let config_descriptor = $crate::usb::CONFIG_DESCRIPTOR.init([0; 256]);
        let bos_descriptor = $crate::usb::BOS_DESCRIPTOR.init([0; 32]);
        let control_buf = $crate::usb::CONTROL_BUF.init([0; 64]);
        let ep_out_buffer = $crate::usb::EP_OUT_BUFFER.init([0u8; 256]);

        let mut usb_config = embassy_stm32::usb::Config::default();
        usb_config.vbus_detection = false;

        let driver = embassy_stm32::usb::Driver::new_fs(
            $peripherals.USB_OTG_HS,
            $crate::usb::Irqs,
            $peripherals.PA12,
            $peripherals.PA11,
            ep_out_buffer,
            usb_config,
        );

        $crate::usb::UsbHardware {
            driver,
            config_descriptor,
            bos_descriptor,
            control_buf,
        }
    }};
}

static CONFIGURED: AtomicBool = AtomicBool::new(false);

/// True while the host has the device in its configured state.
pub fn is_configured() -> bool {
    CONFIGURED.load(Ordering::Relaxed)
}

struct ConfiguredFlag;

impl Handler for ConfiguredFlag {
    fn reset(&mut self) {
        CONFIGURED.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        CONFIGURED.store(configured, Ordering::Relaxed);
        info!("USB configured: {}", configured);
    }
}

static CONFIGURED_FLAG: StaticCell<ConfiguredFlag> = StaticCell::new();

/// Device builder with the descriptors shared by both personas. The caller
/// adds its class and builds.
pub fn builder(hardware: UsbHardware<'static>, mode: Mode) -> Builder<'static, UsbDriver> {
    let mut usb_config = embassy_usb::Config::new(0x1209, 0x0001);
    usb_config.manufacturer = Some("uart-bridge");
    usb_config.product = Some(match mode {
        Mode::MidiTranslator => "UART MIDI Bridge",
        Mode::SerialBridge => "UART Serial Bridge",
    });
    usb_config.serial_number = Some("00000001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        hardware.driver,
        usb_config,
        hardware.config_descriptor,
        hardware.bos_descriptor,
        &mut [], // no msos descriptors
        hardware.control_buf,
    );
    builder.handler(CONFIGURED_FLAG.init(ConfiguredFlag));
    builder
}

#[embassy_executor::task]
pub async fn usb_task(mut usb_device: UsbDevice<'static, UsbDriver>) {
    usb_device.run().await;
}

pub struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => defmt::panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}
