//! WiFi bring-up and reconnect

use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::*;

pub fn connect_wifi(
    wifi: &mut BlockingWifi<EspWifi<'static>>,
    ssid: &str,
    password: &str,
) -> anyhow::Result<()> {
    let wifi_config = Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow::anyhow!("SSID too long"))?,
        password: password
            .try_into()
            .map_err(|_| anyhow::anyhow!("WiFi password too long"))?,
        ..Default::default()
    });

    wifi.set_configuration(&wifi_config)?;
    wifi.start()?;
    info!("WiFi started, connecting to {}...", ssid);

    wifi.connect()?;
    wifi.wait_netif_up()?;
    info!("Network interface is up");

    Ok(())
}

/// Check WiFi connectivity and reconnect if needed
pub fn ensure_wifi_connected(wifi: &mut BlockingWifi<EspWifi<'static>>) {
    if wifi.is_connected().unwrap_or(false) {
        return;
    }

    warn!("WiFi disconnected, attempting to reconnect...");

    let mut retry_delay = 1;
    loop {
        match wifi.connect().and_then(|()| wifi.wait_netif_up()) {
            Ok(()) => {
                if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
                    info!("WiFi reconnected, IP: {:?}", ip_info);
                }
                return;
            }
            Err(e) => {
                warn!(
                    "WiFi reconnect failed: {:?}, retrying in {}s...",
                    e, retry_delay
                );
            }
        }

        std::thread::sleep(std::time::Duration::from_secs(retry_delay));
        retry_delay = (retry_delay * 2).min(60);
    }
}
