#![allow(missing_docs)]
#![no_std]
#![no_main]

use core::{convert::Infallible, panic};
use embassy_executor::Spawner;
use embassy_rp::{
    bind_interrupts,
    peripherals::UART0,
    pwm::{Config as PwmConfig, Pwm},
    uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig},
};
use embassy_time::Duration;
use servo_arm::{
    Error, Result,
    actuator::ServoActuator,
    config::{ArmConfig, SERIAL_BAUDRATE},
    link::{ArmLink, announce_ready},
    rp_pwm::{PwmChannel, RpPwmDriver},
};
use static_cell::StaticCell;
use {
    defmt::{Display2Format, info, warn},
    defmt_rtt as _, panic_probe as _,
};

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// A packet's bytes arrive back to back; a gap this long means one was lost.
const IDLE_RESET: Duration = Duration::from_millis(50);

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    static TX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    static RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = SERIAL_BAUDRATE;
    // Host link on GPIO 0 (TX) / GPIO 1 (RX)
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        TX_BUFFER.init([0; 64]),
        RX_BUFFER.init([0; 64]),
        uart_config,
    );
    let (mut tx, mut rx) = uart.split();

    // One servo per PWM slice, on even GPIOs 2..=12 (slice = pin / 2)
    let pwm = RpPwmDriver::new([
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE1, p.PIN_2, PwmConfig::default())),
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, PwmConfig::default())),
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, PwmConfig::default())),
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default())),
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, PwmConfig::default())),
        PwmChannel::new_output_a(Pwm::new_output_a(p.PWM_SLICE6, p.PIN_12, PwmConfig::default())),
    ]);

    let mut link = ArmLink::new(ServoActuator::new(pwm, ArmConfig::DEFAULT));
    link.init();
    info!("Arm ready at {} baud", SERIAL_BAUDRATE);
    if let Err(err) = announce_ready(&mut tx).await {
        warn!("Ready line not sent: {}", Display2Format(&err));
    }

    // Read errors are absorbed by the link. Only a failed reply or the end of
    // a stream that should never end gets here.
    let outcome = link.run_with_idle_reset(&mut rx, &mut tx, IDLE_RESET).await;
    link.actuator_mut().disable_all();
    outcome?;
    Err(Error::Transport(embedded_io_async::ErrorKind::BrokenPipe))
}
