use config::BridgeConfig;
use defmt::info;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{self, Uart};
use embassy_stm32::{Config, bind_interrupts, peripherals};

use crate::uart::uart_config;
use crate::usb::UsbHardware;

bind_interrupts!(pub struct Irqs {
    UART4 => usart::InterruptHandler<peripherals::UART4>;
});

pub struct Hardware<'a> {
    pub config: BridgeConfig,
    pub uart: Uart<'a, Async>,
    /// Traffic towards the host.
    pub tx_led: Output<'a>,
    /// Traffic from the host.
    pub rx_led: Output<'a>,
    pub usb: UsbHardware<'a>,
}

impl Hardware<'static> {
    pub fn get() -> Hardware<'static> {
        info!("Initializing");
        let peripherals = embassy_stm32::init(clock_config());

        // Jumper on PB2 pulls it low.
        let strap = Input::new(peripherals.PB2, Pull::Up);
        let config = BridgeConfig::from_strap(strap.is_high());
        drop(strap);

        let uart = Uart::new(
            peripherals.UART4,
            peripherals.PA1,
            peripherals.PA0,
            Irqs,
            peripherals.DMA1_CH1,
            peripherals.DMA1_CH0,
            uart_config(&config.initial_line_settings()),
        )
        .unwrap();

        let tx_led = Output::new(peripherals.PB0, Level::Low, Speed::Low);
        let rx_led = Output::new(peripherals.PE1, Level::Low, Speed::Low);

        let usb = crate::get_usb_hardware!(peripherals);

        Hardware {
            config,
            uart,
            tx_led,
            rx_led,
            usb,
        }
    }
}

fn clock_config() -> Config {
    use embassy_stm32::rcc::*;

    let mut config = Config::default();
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;
    // USB runs from HSI48, trimmed against the host's SOF.
    config.rcc.hsi48 = Some(Hsi48Config { sync_from_usb: true });
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV2;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;
    config.rcc.voltage_scale = VoltageScale::Scale1;
    config.rcc.mux.usbsel = mux::Usbsel::HSI48;
    config
}
