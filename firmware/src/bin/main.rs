#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUart, Config as UartConfig};
use embassy_time::Delay;
use kspio_firmware::{
    BoardLamps, BoardSwitches, EmbassyClock, IoPort, KspioLink, LinkEvent, BAUD_RATE,
    DEFAULT_CONFIG, UART_BUFFER_SIZE,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// UART ring buffers.
static TX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_BUFFER_SIZE]> = StaticCell::new();

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("KSPIO board starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- UART Setup ---
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0; UART_BUFFER_SIZE]);
    let rx_buf = RX_BUF.init([0; UART_BUFFER_SIZE]);
    let uart = BufferedUart::new(
        p.UART0,
        p.PIN_0, // TX
        p.PIN_1, // RX
        Irqs,
        tx_buf,
        rx_buf,
        uart_config,
    );

    // --- Panel Setup ---
    let lamps: BoardLamps<'_> = BoardLamps::new(
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
    );
    let mut switches: BoardSwitches<'_> = BoardSwitches::new(
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
    );

    let mut link = KspioLink::new(IoPort::new(uart), EmbassyClock, lamps, DEFAULT_CONFIG);
    link.lamp_test(&mut Delay);

    info!("KSPIO board initialized, waiting for handshake...");

    loop {
        match link.input() {
            Ok(LinkEvent::Handshake) => info!("handshake answered"),
            Ok(LinkEvent::Disconnected) => info!("host went quiet"),
            Ok(_) => {}
            Err(e) => warn!("handshake reply failed: {:?}", e),
        }

        if let Err(e) = link.output_with(|packet| switches.sample(packet)) {
            warn!("control send failed: {:?}", e);
        }

        yield_now().await;
    }
}
