use config::{DataBits, LineSettings, Parity, StopBits};
use embassy_stm32::usart;

/// The peripheral has no six bit words, so six data bits run as seven.
pub fn uart_config(settings: &LineSettings) -> usart::Config {
    let mut config = usart::Config::default();
    config.baudrate = settings.baud_rate;
    config.data_bits = match settings.data_bits {
        DataBits::Six | DataBits::Seven => usart::DataBits::DataBits7,
        DataBits::Eight => usart::DataBits::DataBits8,
    };
    config.parity = match settings.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Odd => usart::Parity::ParityOdd,
        Parity::Even => usart::Parity::ParityEven,
    };
    config.stop_bits = match settings.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    config
}
