use defmt::{info, trace};
use embassy_usb::class::midi::{Receiver, Sender};
use midi::UsbMidiPacket;

use super::{INBOUND_CHANNEL, OUTBOUND_CHANNEL};
use crate::usb::{Disconnected, UsbDriver};

async fn send_outbound(sender: &mut Sender<'static, UsbDriver>) -> Result<(), Disconnected> {
    loop {
        let packet = OUTBOUND_CHANNEL.receive().await;
        sender.write_packet(&packet.to_bytes()).await?;
        trace!("Sent {}", packet);
    }
}

#[embassy_executor::task]
pub async fn midi_usb_in_task(mut sender: Sender<'static, UsbDriver>) {
    loop {
        sender.wait_connection().await;
        info!("USB MIDI IN connected");

        let _ = send_outbound(&mut sender).await;

        info!("USB MIDI IN disconnected");
    }
}

async fn receive_inbound(receiver: &mut Receiver<'static, UsbDriver>) -> Result<(), Disconnected> {
    let mut buffer = [0; 64];
    loop {
        let n = receiver.read_packet(&mut buffer).await?;

        // One transfer may carry several 4 byte event packets.
        for chunk in buffer[..n].chunks_exact(4) {
            let packet = UsbMidiPacket::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            INBOUND_CHANNEL.send(packet).await;
        }
    }
}

#[embassy_executor::task]
pub async fn midi_usb_out_task(mut receiver: Receiver<'static, UsbDriver>) {
    loop {
        receiver.wait_connection().await;
        info!("USB MIDI OUT connected");

        let _ = receive_inbound(&mut receiver).await;

        info!("USB MIDI OUT disconnected");
    }
}
