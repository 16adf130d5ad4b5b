/// An on/off status output, usually an LED.
pub trait StatusLed {
    fn set_on(&mut self);
    fn set_off(&mut self);
}

/// Keeps a status LED lit for a number of main-loop iterations after the last
/// bit of traffic. Counts loop iterations, not time.
pub struct ActivityIndicator<L: StatusLed> {
    led: L,
    ticks: u16,
    remaining: u16,
}

impl<L: StatusLed> ActivityIndicator<L> {
    pub fn new(mut led: L, ticks: u16) -> Self {
        led.set_off();
        Self {
            led,
            ticks,
            remaining: 0,
        }
    }

    pub fn arm(&mut self) {
        self.remaining = self.ticks;
        if self.remaining > 0 {
            self.led.set_on();
        }
    }

    /// Call once per main-loop iteration.
    pub fn tick(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.led.set_off();
            }
        }
    }

    pub fn is_lit(&self) -> bool {
        self.remaining > 0
    }

    pub fn led(&self) -> &L {
        &self.led
    }
}
