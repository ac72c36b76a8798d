use std::env;

use log::info;
use tokio_util::sync::CancellationToken;

use joycon2_ble::connection::bluetooth::{self, FALLBACK_WINDOW, SCAN_WINDOW};
use joycon2_ble::connection::ConnectionError;
use joycon2_ble::session::{Session, TrackedReport};

#[tokio::main]
async fn main() -> Result<(), ConnectionError> {
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Always,
    )
    .unwrap();

    // An address on the command line skips discovery entirely.
    let controller = match env::args().nth(1) {
        Some(address) => bluetooth::find_by_address(&address, SCAN_WINDOW).await?,
        None => bluetooth::find_controller(SCAN_WINDOW, FALLBACK_WINDOW).await?,
    };

    info!(
        "Connecting: {} ({}) - {}",
        controller.name.as_deref().unwrap_or("Joy-Con 2"),
        controller.address,
        controller.side
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::signal::ctrl_c().await.ok();
            cancel.cancel();
        }
    });

    info!("Press Ctrl+C to exit.");
    Session::new(controller.into_connection())
        .run(cancel, print_report)
        .await
}

fn print_report(tracked: TrackedReport) {
    let report = &tracked.report;
    let (delta_x, delta_y) = tracked.pointer_delta;

    let pressed = report.buttons.pressed_labels();
    let pressed = if pressed.is_empty() {
        "None".to_string()
    } else {
        pressed.join(", ")
    };

    println!("\n{}", "=".repeat(50));
    println!("PacketID: {}", report.packet_id);
    println!("Buttons: {:08X}", report.buttons.bits());
    println!("Pressed: {}", pressed);
    println!(
        "LeftStick: X={}, Y={}",
        report.left_stick.x, report.left_stick.y
    );
    println!(
        "RightStick: X={}, Y={}",
        report.right_stick.x, report.right_stick.y
    );
    println!(
        "Pointer: X={}, Y={}, DeltaX={}, DeltaY={}, Unk={}, Distance={}",
        report.pointer_x,
        report.pointer_y,
        delta_x,
        delta_y,
        report.pointer_unknown,
        report.pointer_distance
    );
    println!(
        "Mag: X={}, Y={}, Z={}",
        report.magnetometer.x, report.magnetometer.y, report.magnetometer.z
    );
    println!(
        "Accel: X={}, Y={}, Z={}",
        report.accelerometer.x, report.accelerometer.y, report.accelerometer.z
    );
    println!(
        "Gyro: X={}, Y={}, Z={}",
        report.gyroscope.x, report.gyroscope.y, report.gyroscope.z
    );
    println!(
        "Battery: {:.2}V, {:.1}mA",
        report.battery_voltage(),
        report.battery_current()
    );
    println!("Temperature: {:.1}°C", report.temperature());
    println!(
        "Triggers: L={}, R={}",
        report.trigger_left, report.trigger_right
    );
}
