use std::collections::HashMap;
use std::time::Duration;

use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::stream::{BoxStream, Stream, StreamExt};
use log::{info, trace, warn};
use uuid::Uuid;

use super::{ConnectionError, Transport};
use crate::device::ControllerSide;
use crate::encode::Encode;

/// Bluetooth SIG company identifier carried by controller advertisements.
pub const MANUFACTURER_ID: u16 = 0x0553;

/// Command characteristic UUID
pub const CHARACTERISTIC_COMMAND: Uuid = Uuid::from_u128(0x649d4ac9_8eb7_4e6c_af44_1ea54fe5f005); // WRITE | WRITE_WITHOUT_RESPONSE

/// Telemetry characteristic UUID
pub const CHARACTERISTIC_TELEMETRY: Uuid = Uuid::from_u128(0xab7de9be_89fe_49ad_828f_118f09df7fd2); // NOTIFY

/// Default length of the advertisement scan before the fallback pass runs.
pub const SCAN_WINDOW: Duration = Duration::from_secs(10);

/// Default length of the enumerated fallback pass.
pub const FALLBACK_WINDOW: Duration = Duration::from_secs(5);

/// A controller located by one of the discovery strategies.
#[derive(Debug, Clone)]
pub struct DiscoveredController {
    peripheral: Peripheral,
    /// Peripheral address (a MAC address on most platforms).
    pub address: String,
    pub name: Option<String>,
    pub rssi: Option<i16>,
    /// Raw manufacturer-data payload captured at discovery time.
    pub manufacturer_data: Vec<u8>,
    pub side: ControllerSide,
}

impl DiscoveredController {
    async fn from_peripheral(
        peripheral: Peripheral,
        manufacturer_data: Vec<u8>,
    ) -> Result<Self, ConnectionError> {
        let properties = peripheral.properties().await?;
        let (name, rssi) = match properties {
            Some(properties) => (properties.local_name, properties.rssi),
            None => (None, None),
        };
        let side = ControllerSide::from_manufacturer_data(&manufacturer_data);

        let controller = Self {
            address: peripheral.address().to_string(),
            name,
            rssi,
            manufacturer_data,
            side,
            peripheral,
        };
        info!(
            "Found controller {} ({}): side {}, rssi {:?}, manufacturer data {:02x?}",
            controller.name.as_deref().unwrap_or("<unnamed>"),
            controller.address,
            controller.side,
            controller.rssi,
            controller.manufacturer_data,
        );
        Ok(controller)
    }

    /// Wraps the peripheral in a transport ready for a session to drive.
    pub fn into_connection(self) -> BluetoothConnection {
        BluetoothConnection::new(self.peripheral)
    }
}

/// Locates a controller by its advertised manufacturer data.
///
/// Two strategies run in order. The advertisement scan resolves manufacturer
/// data either from the advertisement event itself or from the peripheral's
/// cached properties, whichever the platform surfaces, and returns the moment
/// a payload keyed by [`MANUFACTURER_ID`] shows up. If the scan window closes
/// without a match, a bounded enumeration pass walks every visible
/// peripheral's properties instead. Platforms differ in which of the two
/// lookups can observe per-device manufacturer data, so both run before
/// giving up.
pub async fn find_controller(
    scan_window: Duration,
    fallback_window: Duration,
) -> Result<DiscoveredController, ConnectionError> {
    let manager = Manager::new().await?;
    let adapter = first_adapter(&manager).await?;

    let events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    info!("Scanning for controller advertisements...");

    let lookup = adapter.clone();
    let matches = events.filter_map(move |event| {
        let adapter = lookup.clone();
        async move { advertised_manufacturer_data(&adapter, event).await }
    });
    tokio::pin!(matches);

    if let Some((id, payload)) =
        first_manufacturer_match(&mut matches, MANUFACTURER_ID, scan_window).await
    {
        let peripheral = adapter.peripheral(&id).await?;
        adapter.stop_scan().await?;
        return DiscoveredController::from_peripheral(peripheral, payload).await;
    }

    // The advertisement scan came up empty; let the scan run a little longer,
    // then walk the accumulated device list once.
    info!("No advertisement match, enumerating visible devices...");
    tokio::time::sleep(fallback_window).await;
    let peripherals = adapter.peripherals().await?;
    adapter.stop_scan().await?;

    for peripheral in peripherals {
        if let Some(properties) = peripheral.properties().await? {
            if let Some(payload) = properties.manufacturer_data.get(&MANUFACTURER_ID) {
                let payload = payload.clone();
                return DiscoveredController::from_peripheral(peripheral, payload).await;
            }
        }
    }

    Err(ConnectionError::ControllerNotFound)
}

/// Locates a peripheral by its address string, skipping manufacturer-data
/// discovery entirely.
///
/// The side stays [`ControllerSide::Unknown`] unless the peripheral happens
/// to expose a classifiable payload in its properties.
pub async fn find_by_address(
    address: &str,
    scan_window: Duration,
) -> Result<DiscoveredController, ConnectionError> {
    let manager = Manager::new().await?;
    let adapter = first_adapter(&manager).await?;

    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    info!("Scanning for peripheral {}...", address);

    let found = tokio::time::timeout(scan_window, async {
        loop {
            for peripheral in adapter.peripherals().await? {
                if peripheral.address().to_string().eq_ignore_ascii_case(address) {
                    return Ok(peripheral);
                }
            }
            if events.next().await.is_none() {
                return Err(ConnectionError::ControllerNotFound);
            }
        }
    })
    .await
    .map_err(|_| ConnectionError::ControllerNotFound)??;

    adapter.stop_scan().await?;

    let payload = match found.properties().await? {
        Some(properties) => properties
            .manufacturer_data
            .get(&MANUFACTURER_ID)
            .cloned()
            .unwrap_or_default(),
        None => Vec::new(),
    };
    DiscoveredController::from_peripheral(found, payload).await
}

async fn first_adapter(manager: &Manager) -> Result<Adapter, ConnectionError> {
    manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or(ConnectionError::NoBluetoothAdapter)
}

/// Resolves the manufacturer data visible for the device behind a scan event.
///
/// Some platforms only surface manufacturer data inside the advertisement
/// event, others only on the peripheral's cached properties; this funnels
/// both paths into one lookup.
async fn advertised_manufacturer_data(
    adapter: &Adapter,
    event: CentralEvent,
) -> Option<(PeripheralId, HashMap<u16, Vec<u8>>)> {
    match event {
        CentralEvent::ManufacturerDataAdvertisement {
            id,
            manufacturer_data,
        } => Some((id, manufacturer_data)),
        CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
            let peripheral = adapter.peripheral(&id).await.ok()?;
            let properties = peripheral.properties().await.ok()??;
            if properties.manufacturer_data.is_empty() {
                None
            } else {
                Some((id, properties.manufacturer_data))
            }
        }
        _ => None,
    }
}

/// Waits for the first scan event carrying a payload keyed by `filter`,
/// giving up once `window` elapses. Exits the instant a match arrives rather
/// than waiting out the window.
async fn first_manufacturer_match<S, D>(
    events: &mut S,
    filter: u16,
    window: Duration,
) -> Option<(D, Vec<u8>)>
where
    S: Stream<Item = (D, HashMap<u16, Vec<u8>>)> + Unpin,
{
    tokio::time::timeout(window, async {
        while let Some((id, data)) = events.next().await {
            if let Some(payload) = data.get(&filter) {
                return Some((id, payload.clone()));
            }
            trace!("Ignoring advertisement without matching manufacturer data");
        }
        None
    })
    .await
    .ok()
    .flatten()
}

struct Characteristics {
    command: Characteristic,
    telemetry: Characteristic,
}

/// A [`Transport`] backed by a btleplug peripheral.
///
/// The GATT characteristics are located during [`Transport::connect`]; the
/// other capabilities fail with [`ConnectionError::NotConnected`] until then.
pub struct BluetoothConnection {
    peripheral: Peripheral,
    characteristics: Option<Characteristics>,
}

impl BluetoothConnection {
    pub fn new(peripheral: Peripheral) -> Self {
        Self {
            peripheral,
            characteristics: None,
        }
    }

    fn characteristics(&self) -> Result<&Characteristics, ConnectionError> {
        self.characteristics
            .as_ref()
            .ok_or(ConnectionError::NotConnected)
    }
}

impl Transport for BluetoothConnection {
    type Notifications = BoxStream<'static, Vec<u8>>;

    async fn connect(&mut self) -> Result<(), ConnectionError> {
        if !self
            .peripheral
            .is_connected()
            .await
            .map_err(ConnectionError::ConnectFailed)?
        {
            self.peripheral
                .connect()
                .await
                .map_err(ConnectionError::ConnectFailed)?;
        } else {
            warn!("Peripheral already connected?");
        }

        self.peripheral
            .discover_services()
            .await
            .map_err(ConnectionError::ConnectFailed)?;

        let mut command = None;
        let mut telemetry = None;
        for characteristic in self.peripheral.characteristics() {
            match characteristic.uuid {
                CHARACTERISTIC_COMMAND => command = Some(characteristic),
                CHARACTERISTIC_TELEMETRY => telemetry = Some(characteristic),
                _ => {}
            }
        }

        self.characteristics = Some(Characteristics {
            command: command
                .ok_or(ConnectionError::MissingCharacteristic(CHARACTERISTIC_COMMAND))?,
            telemetry: telemetry.ok_or(ConnectionError::MissingCharacteristic(
                CHARACTERISTIC_TELEMETRY,
            ))?,
        });

        Ok(())
    }

    async fn write_command(&mut self, packet: impl Encode + Send) -> Result<(), ConnectionError> {
        let encoded = packet.encode();
        trace!("Writing command: {:02x?}", encoded);

        let characteristics = self.characteristics()?;
        self.peripheral
            .write(&characteristics.command, &encoded, WriteType::WithoutResponse)
            .await
            .map_err(ConnectionError::WriteFailed)
    }

    async fn subscribe(&mut self) -> Result<Self::Notifications, ConnectionError> {
        let characteristics = self.characteristics()?;
        self.peripheral
            .subscribe(&characteristics.telemetry)
            .await
            .map_err(ConnectionError::SubscribeFailed)?;

        let uuid = characteristics.telemetry.uuid;
        let notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(ConnectionError::SubscribeFailed)?;

        Ok(notifications
            .filter_map(move |notification| async move {
                (notification.uuid == uuid).then_some(notification.value)
            })
            .boxed())
    }

    async fn disconnect(&mut self) -> Result<(), ConnectionError> {
        if self.peripheral.is_connected().await? {
            self.peripheral.disconnect().await?;
            info!("Disconnected from controller");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use futures::stream::{self, StreamExt};

    use super::{first_manufacturer_match, MANUFACTURER_ID};
    use crate::device::ControllerSide;

    fn payload_with_side(side: u8) -> Vec<u8> {
        vec![0x01, 0x00, 0x03, 0x7E, 0x05, side, 0x00]
    }

    #[tokio::test(start_paused = true)]
    async fn first_match_wins_without_waiting_out_the_window() {
        let mut events = stream::iter(vec![
            (1u32, HashMap::from([(0x004Cu16, vec![0u8; 7])])),
            (2, HashMap::from([(MANUFACTURER_ID, payload_with_side(0x66))])),
            (3, HashMap::from([(MANUFACTURER_ID, payload_with_side(0x67))])),
        ]);

        let (id, payload) =
            first_manufacturer_match(&mut events, MANUFACTURER_ID, Duration::from_secs(10))
                .await
                .expect("the second advertisement matches");

        assert_eq!(id, 2);
        assert_eq!(
            ControllerSide::from_manufacturer_data(&payload),
            ControllerSide::Right
        );
        // The scan stopped at the match; later advertisements stay unread.
        assert_eq!(events.next().await.unwrap().0, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn a_quiet_channel_times_out() {
        let mut events = stream::pending::<(u32, HashMap<u16, Vec<u8>>)>();
        assert!(
            first_manufacturer_match(&mut events, MANUFACTURER_ID, Duration::from_secs(10))
                .await
                .is_none()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn other_manufacturer_ids_never_match() {
        let mut events = stream::iter(vec![
            (1u32, HashMap::from([(0x004Cu16, payload_with_side(0x66))])),
            (2, HashMap::from([(0x0554u16, payload_with_side(0x66))])),
        ]);
        assert!(
            first_manufacturer_match(&mut events, MANUFACTURER_ID, Duration::from_secs(10))
                .await
                .is_none()
        );
    }
}
