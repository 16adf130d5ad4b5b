use embassy_stm32::gpio::Output;
use midi::StatusLed;

pub struct Led<'a> {
    pin: Output<'a>,
}

impl<'a> Led<'a> {
    pub fn new(pin: Output<'a>) -> Self {
        Self { pin }
    }
}

impl StatusLed for Led<'_> {
    fn set_on(&mut self) {
        self.pin.set_high();
    }

    fn set_off(&mut self) {
        self.pin.set_low();
    }
}
