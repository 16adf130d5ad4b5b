use config::{BridgeConfig, HOST_CHUNK_LIMIT, LineSettings, SERIAL_BUFFER_SIZE, USB_PACKET_SIZE};
use defmt::{info, trace};
use embassy_executor::{SendSpawner, Spawner};
use embassy_futures::select::{Either, select};
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{RingBufferedUartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_sync::signal::Signal;
use embassy_usb::class::cdc_acm::{self, CdcAcmClass};
use static_cell::StaticCell;

use crate::hardware::Hardware;
use crate::uart::uart_config;
use crate::usb::{self, Disconnected, UsbDriver};

pub const UART_RX_BUFFER_SIZE: usize = 64;

/// UART bytes waiting to go to the host.
static UART_TO_HOST: Pipe<CriticalSectionRawMutex, SERIAL_BUFFER_SIZE> = Pipe::new();

/// New framing for the receive half, raised when the host changes line coding.
static RX_LINE_SETTINGS: Signal<CriticalSectionRawMutex, LineSettings> = Signal::new();

static CDC_STATE: StaticCell<cdc_acm::State<'static>> = StaticCell::new();
static UART_RX_BUFFER: StaticCell<[u8; UART_RX_BUFFER_SIZE]> = StaticCell::new();

pub fn spawn_tasks(
    config: &'static BridgeConfig,
    hardware: Hardware<'static>,
    spawner: Spawner,
    uart_spawner: SendSpawner,
) {
    let mut builder = usb::builder(hardware.usb, config.mode);
    let cdc_class = CdcAcmClass::new(&mut builder, CDC_STATE.init(cdc_acm::State::new()), USB_PACKET_SIZE);
    let usb_device = builder.build();
    let (usb_sender, usb_receiver, control) = cdc_class.split_with_control();

    let (uart_tx, uart_rx) = hardware.uart.split();
    let uart_rx = uart_rx.into_ring_buffered(UART_RX_BUFFER.init([0; UART_RX_BUFFER_SIZE]));

    uart_spawner.spawn(uart_rx_task(uart_rx)).unwrap();
    spawner.spawn(usb::usb_task(usb_device)).unwrap();
    spawner.spawn(host_in_task(usb_sender)).unwrap();
    spawner
        .spawn(host_out_task(usb_receiver, control, uart_tx, config.serial))
        .unwrap();

    info!("Serial bridge running");
}

#[embassy_executor::task]
async fn uart_rx_task(mut uart_rx: RingBufferedUartRx<'static>) {
    let mut buffer = [0; 16];
    loop {
        let event = select(uart_rx.read(&mut buffer), RX_LINE_SETTINGS.wait()).await;

        match event {
            Either::First(Ok(n)) => {
                if !usb::is_configured() {
                    continue;
                }
                let written = UART_TO_HOST.try_write(&buffer[..n]).unwrap_or(0);
                if written < n {
                    trace!("Host buffer full, dropped {} bytes", n - written);
                }
            }
            Either::First(Err(err)) => {
                trace!("Error reading from UART: {}", err);
            }
            Either::Second(settings) => {
                if let Err(err) = uart_rx.set_config(&uart_config(&settings)) {
                    info!("Rejected line settings {}: {}", settings, err);
                }
            }
        }
    }
}

async fn forward_to_host(sender: &mut cdc_acm::Sender<'static, UsbDriver>) -> Result<(), Disconnected> {
    // Short packets only, so no transfer ever needs a zero length terminator.
    let mut chunk = [0; HOST_CHUNK_LIMIT];
    loop {
        let n = UART_TO_HOST.read(&mut chunk).await;
        sender.write_packet(&chunk[..n]).await?;
    }
}

#[embassy_executor::task]
async fn host_in_task(mut sender: cdc_acm::Sender<'static, UsbDriver>) {
    loop {
        sender.wait_connection().await;
        info!("Serial IN connected");

        let _ = forward_to_host(&mut sender).await;

        info!("Serial IN disconnected");
    }
}

fn host_line_settings(receiver: &cdc_acm::Receiver<'static, UsbDriver>) -> LineSettings {
    let coding = receiver.line_coding();
    LineSettings::from_line_coding(
        coding.data_rate(),
        coding.data_bits(),
        coding.parity_type() as u8,
        coding.stop_bits() as u8,
    )
}

/// Follows the host's line coding on both UART halves.
fn apply_line_settings(
    receiver: &cdc_acm::Receiver<'static, UsbDriver>,
    uart_tx: &mut UartTx<'static, Async>,
    current: &mut LineSettings,
) {
    let requested = host_line_settings(receiver);
    if !current.update(requested) {
        return;
    }

    match uart_tx.set_config(&uart_config(&requested)) {
        Ok(()) => {
            info!("Line settings changed to {}", requested);
            RX_LINE_SETTINGS.signal(requested);
        }
        Err(err) => info!("Rejected line settings {}: {}", requested, err),
    }
}

async fn forward_to_uart(
    receiver: &mut cdc_acm::Receiver<'static, UsbDriver>,
    control: &cdc_acm::ControlChanged<'static>,
    uart_tx: &mut UartTx<'static, Async>,
    current: &mut LineSettings,
) -> Result<(), Disconnected> {
    let mut buffer = [0; USB_PACKET_SIZE as usize];
    loop {
        // SET_LINE_CODING can arrive while the host sends nothing.
        let event = select(receiver.read_packet(&mut buffer), control.control_changed()).await;

        match event {
            Either::First(read) => {
                let n = read?;
                if let Err(err) = uart_tx.write(&buffer[..n]).await {
                    trace!("Error writing to UART: {}", err);
                }
            }
            Either::Second(()) => apply_line_settings(receiver, uart_tx, current),
        }
    }
}

#[embassy_executor::task]
async fn host_out_task(
    mut receiver: cdc_acm::Receiver<'static, UsbDriver>,
    control: cdc_acm::ControlChanged<'static>,
    mut uart_tx: UartTx<'static, Async>,
    initial: LineSettings,
) {
    let mut current = initial;
    loop {
        receiver.wait_connection().await;
        info!("Serial OUT connected");
        apply_line_settings(&receiver, &mut uart_tx, &mut current);

        let _ = forward_to_uart(&mut receiver, &control, &mut uart_tx, &mut current).await;

        info!("Serial OUT disconnected");
    }
}
