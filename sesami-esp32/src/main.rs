//! Sesami lock button for ESP32
//!
//! Press the BOOT button to toggle a Sesame lock through the cloud API. The
//! built-in LED mirrors the lock state, refreshed by polling the status
//! endpoint.

mod http;
mod wifi;

use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{
        gpio::{PinDriver, Pull},
        prelude::Peripherals,
    },
    nvs::EspDefaultNvsPartition,
    sntp::{EspSntp, SyncStatus},
    wifi::{BlockingWifi, EspWifi},
};
use log::*;
use sesami_mcu::{unix_timestamp, Client, Command};
use sesami_proto::status::{LockState, LockStatus};
use std::time::{Duration, Instant};

// Configuration
const WIFI_SSID: &str = "my-wifi";
const WIFI_PASS: &str = "my-wifi-password";
const DEVICE_ID: &str = "488ABAAB-164F-7A86-595F-DDD778CB86C3";
const API_KEY: &str = "";
const SECRET_KEY: &str = "";
const HISTORY_LABEL: &str = "esp32 button";

const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(60);

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("Sesami lock button v0.1");

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // GPIO2 is the built-in LED, GPIO0 the BOOT button on most dev boards
    let mut led = PinDriver::output(peripherals.pins.gpio2)?;
    let mut button = PinDriver::input(peripherals.pins.gpio0)?;
    button.set_pull(Pull::Up)?;

    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?;
    wifi::connect_wifi(&mut wifi, WIFI_SSID, WIFI_PASS)?;
    info!(
        "WiFi connected, IP: {:?}",
        wifi.wifi().sta_netif().get_ip_info()?
    );

    // Command tags are time based, the clock must be right before signing
    let sntp = EspSntp::new_default()?;
    info!("Waiting for SNTP sync...");
    while sntp.get_sync_status() != SyncStatus::Completed {
        std::thread::sleep(Duration::from_millis(200));
    }
    info!("Time synced: {}", unix_timestamp()?);

    let mut client = Client::new(http::EspTransport);
    let mut last_poll: Option<Instant> = None;
    let mut was_pressed = false;

    loop {
        wifi::ensure_wifi_connected(&mut wifi);

        let pressed = button.is_low();
        if pressed && !was_pressed {
            info!("Button pressed, toggling lock");
            match toggle(&mut client) {
                Ok(()) => info!("Toggle accepted"),
                Err(e) => error!("Toggle failed: {:?}", e),
            }
            // re-read state soon after a command
            last_poll = None;
        }
        was_pressed = pressed;

        if last_poll.map_or(true, |t| t.elapsed() >= STATUS_POLL_INTERVAL) {
            match poll_status(&mut client) {
                Ok(state) => {
                    if state == LockState::Locked {
                        led.set_high()?;
                    } else {
                        led.set_low()?;
                    }
                }
                Err(e) => error!("Status poll failed: {:?}", e),
            }
            last_poll = Some(Instant::now());
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

fn toggle(client: &mut Client<http::EspTransport>) -> anyhow::Result<()> {
    client.send_command(
        unix_timestamp()?,
        DEVICE_ID,
        Command::Toggle,
        API_KEY,
        SECRET_KEY,
        HISTORY_LABEL,
    )?;
    Ok(())
}

fn poll_status(client: &mut Client<http::EspTransport>) -> anyhow::Result<LockState> {
    let body = client.get_status(DEVICE_ID, API_KEY)?;
    let status = LockStatus::from_body(&body)?;
    info!("Lock: {}", status.summary());
    Ok(status.state.unwrap_or(LockState::Unknown))
}
