//! # Device Tests
//!
//! End-to-end tests of the protocol engine, configuration schema and file
//! operations against a simulated printer, plus one exchange over a real
//! TCP socket.

use std::io::{Cursor, Read, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use zebconf::printer::ConnectionConfig;
use zebconf::schema::{ConfigRoot, WifiAuth};
use zebconf::transport::{SimulatedPrinter, Transport};
use zebconf::transport::simulated::Behavior;
use zebconf::{Firmware, ZebraDevice, ZebraError};

const TIMEOUT: Duration = Duration::from_millis(5);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn device(printer: SimulatedPrinter) -> ZebraDevice<SimulatedPrinter> {
    ZebraDevice::new(printer, TIMEOUT)
}

fn written_lines(device: &ZebraDevice<SimulatedPrinter>) -> Vec<String> {
    device
        .transport()
        .written()
        .iter()
        .map(|w| String::from_utf8_lossy(w).into_owned())
        .collect()
}

fn firmware_zip(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
    }
    let mut cursor = writer.finish().unwrap();
    cursor.set_position(0);
    cursor
}

// ============================================================================
// VARIABLES
// ============================================================================

#[test]
fn test_setvar_then_getvar_echoes() {
    let mut dev = device(SimulatedPrinter::new());
    let essid = dev
        .session(|d| {
            d.setvar("wlan.essid", "TestNet")?;
            d.getvar("wlan.essid")
        })
        .unwrap();
    assert_eq!(essid, "TestNet");
}

#[test]
fn test_unknown_variable() {
    let mut dev = device(SimulatedPrinter::new().with_behavior(Behavior::AlwaysUnknown));
    let err = dev.session(|d| d.getvar("no.such.var")).unwrap_err();
    match err {
        ZebraError::UnknownVariable(name) => assert_eq!(name, "no.such.var"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dev.transport().is_open());
}

#[test]
fn test_silent_device_times_out() {
    let mut dev = device(SimulatedPrinter::new().with_behavior(Behavior::Silent));
    let err = dev.session(|d| d.getvar("device.friendly_name")).unwrap_err();
    assert!(matches!(err, ZebraError::Timeout));
    assert_eq!(dev.transport().close_count(), 1);
}

#[test]
fn test_fragmented_response() {
    let printer = SimulatedPrinter::new()
        .with_var("device.friendly_name", "Shipping Dock 3")
        .with_chunk_size(1);
    let mut dev = device(printer);
    let name = dev.session(|d| d.getvar("device.friendly_name")).unwrap();
    assert_eq!(name, "Shipping Dock 3");
}

#[test]
fn test_io_outside_session_fails() {
    let mut dev = device(SimulatedPrinter::new());
    assert!(matches!(
        dev.setvar("wlan.essid", "TestNet"),
        Err(ZebraError::Transport(_))
    ));
}

// ============================================================================
// SCHEMA
// ============================================================================

#[test]
fn test_schema_round_trips_through_device() {
    let config = ConfigRoot::new();
    let mut dev = device(SimulatedPrinter::new());

    dev.session(|d| {
        config.ip().dhcp().enable().set(d, true)?;
        config.ip().dhcp().cid_type().set(d, 2)?;
        config.wlan().ip().addr().set(d, Ipv4Addr::new(10, 0, 0, 7))?;
        config.wlan().power_save().set(d, false)?;

        assert!(config.ip().dhcp().enable().get(d)?);
        assert_eq!(config.ip().dhcp().cid_type().get(d)?, 2);
        assert_eq!(config.wlan().ip().addr().get(d)?, Ipv4Addr::new(10, 0, 0, 7));
        assert!(!config.wlan().power_save().get(d)?);
        Ok(())
    })
    .unwrap();

    assert_eq!(dev.transport().var("ip.dhcp.enable"), Some("on"));
    assert_eq!(dev.transport().var("wlan.power_save"), Some("off"));
}

#[test]
fn test_last_set_value_wins() {
    let config = ConfigRoot::new();
    let mut dev = device(SimulatedPrinter::new());
    let name = dev
        .session(|d| {
            let field = config.device().friendly_name();
            field.set(d, "first")?;
            field.set(d, "second")?;
            field.get(d)
        })
        .unwrap();
    assert_eq!(name, "second");
}

#[test]
fn test_readonly_variable_is_not_sent() {
    let config = ConfigRoot::new();
    let mut dev = device(SimulatedPrinter::new().with_var("appl.name", "V84.20.18Z"));
    let err = dev
        .session(|d| config.appl().name().set(d, "V0"))
        .unwrap_err();
    assert!(matches!(err, ZebraError::ReadOnlyVariable(ref n) if n == "appl.name"));
    assert!(dev.transport().written().is_empty());

    let version = dev.session(|d| config.appl().name().get(d)).unwrap();
    assert_eq!(version, "V84.20.18Z");
}

#[test]
fn test_bad_on_wire_value() {
    let config = ConfigRoot::new();
    let mut dev = device(SimulatedPrinter::new().with_var("ip.dhcp.enable", "maybe"));
    let err = dev
        .session(|d| config.ip().dhcp().enable().get(d))
        .unwrap_err();
    assert!(matches!(err, ZebraError::Value(_)));
}

// ============================================================================
// WIFI
// ============================================================================

#[test]
fn test_wifi_wpa_psk_workflow() {
    let printer = SimulatedPrinter::new()
        .with_var("wlan.essid", "OldNet")
        .with_var("wlan.wpa.psk", "OLD");
    let mut dev = device(printer);

    dev.session(|d| d.wifi("TestNet", Some("hunter2"), WifiAuth::WpaPsk, Some("US")))
        .unwrap();

    assert_eq!(
        written_lines(&dev),
        vec![
            "! U1 do \"device.restore_defaults\" \"wlan\"\r\n",
            "! U1 setvar \"wlan.essid\" \"TestNet\"\r\n",
            "! U1 setvar \"wlan.country_code\" \"US\"\r\n",
            "! U1 setvar \"wlan.wpa.enable\" \"on\"\r\n",
            "! U1 setvar \"wlan.wpa.authentication\" \"psk\"\r\n",
            "! U1 setvar \"wlan.wpa.psk\" \"5DDBC5E0FD19D7919A86C9652E4996C03C75C8016E5FBD52DB0E89ED12CED7B4\"\r\n",
        ]
    );
    assert_eq!(dev.transport().var("wlan.essid"), Some("TestNet"));
}

#[test]
fn test_wifi_without_country() {
    let mut dev = device(SimulatedPrinter::new());
    dev.session(|d| d.wifi("IEEE", Some("password"), WifiAuth::WpaPsk, None))
        .unwrap();
    assert_eq!(dev.transport().var("wlan.country_code"), None);
    assert_eq!(
        dev.transport().var("wlan.wpa.psk"),
        Some("F42C6FC52DF0EBEF9EBB4B90B38A5F902E83FE1B135A70E23AED762E9710A12E")
    );
}

#[test]
fn test_unsupported_auth_scheme() {
    let err = "wpa_enterprise".parse::<WifiAuth>().unwrap_err();
    assert!(matches!(err, ZebraError::UnsupportedAuth(_)));
}

// ============================================================================
// FILES
// ============================================================================

#[test]
fn test_upload_list_download() {
    let mut dev = device(SimulatedPrinter::new());
    let label = b"^XA^FO50,50^FDHello^FS^XZ";

    let (listing, content) = dev
        .session(|d| {
            d.upload("HELLO.ZPL", label)?;
            let listing = d.list()?;
            let content = d.download("HELLO.ZPL")?;
            Ok((listing, content))
        })
        .unwrap();

    assert!(listing.contains("E:HELLO.ZPL 25"));
    assert!(!listing.starts_with('"'));
    assert!(!listing.ends_with('"'));
    assert_eq!(content, label);
}

#[test]
fn test_rename_and_delete() {
    let printer = SimulatedPrinter::new()
        .with_file("A.ZPL", b"a")
        .with_file("B.ZPL", b"b");
    let mut dev = device(printer);

    dev.session(|d| {
        d.rename("A.ZPL", "C.ZPL")?;
        d.delete("B.ZPL")
    })
    .unwrap();

    let printer = dev.transport();
    assert_eq!(printer.file("A.ZPL"), None);
    assert_eq!(printer.file("B.ZPL"), None);
    assert_eq!(printer.file("C.ZPL"), Some(&b"a"[..]));
    assert_eq!(
        printer.actions(),
        &[
            ("file.rename".to_string(), "A.ZPL C.ZPL".to_string()),
            ("file.delete".to_string(), "B.ZPL".to_string()),
        ]
    );
}

#[test]
fn test_download_missing_file_times_out() {
    let mut dev = device(SimulatedPrinter::new());
    let err = dev.session(|d| d.download("NOPE.ZPL")).unwrap_err();
    assert!(matches!(err, ZebraError::Timeout));
}

#[test]
fn test_binary_download() {
    let content: Vec<u8> = (0..=255).collect();
    let mut dev = device(
        SimulatedPrinter::new()
            .with_file("FONT.TTF", &content)
            .with_chunk_size(100),
    );
    let downloaded = dev.session(|d| d.download("FONT.TTF")).unwrap();
    assert_eq!(downloaded, content);
}

// ============================================================================
// FIRMWARE
// ============================================================================

#[test]
fn test_upgrade_sends_raw_payload() {
    let firmware = Firmware::from_reader(firmware_zip(&[
        ("V84.20.18Z.zpl", b"\x00\x01firmware-image\xff"),
        ("README.txt", b"notes"),
    ]))
    .unwrap();
    assert_eq!(firmware.version(), "V84.20.18Z");

    let mut dev = device(SimulatedPrinter::new());
    dev.session(|d| d.upgrade(&firmware)).unwrap();

    assert_eq!(
        dev.transport().payloads(),
        &[b"\x00\x01firmware-image\xff".to_vec()]
    );
}

#[test]
fn test_firmware_must_have_exactly_one_payload() {
    let none = Firmware::from_reader(firmware_zip(&[("README.txt", b"notes")]));
    assert!(matches!(none, Err(ZebraError::BadFirmware(_))));

    let two = Firmware::from_reader(firmware_zip(&[("a.zpl", b"a"), ("b.zpl", b"b")]));
    assert!(matches!(two, Err(ZebraError::BadFirmware(_))));
}

// ============================================================================
// NETWORK
// ============================================================================

#[test]
fn test_getvar_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let printer = thread::spawn(move || {
        let (mut conn, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 256];
        while !request.ends_with(b"\r\n") {
            let n = conn.read(&mut buf).unwrap();
            assert!(n > 0);
            request.extend_from_slice(&buf[..n]);
        }
        assert_eq!(request, b"! U1 getvar \"appl.name\"\r\n");
        // Split the reply to exercise accumulation
        conn.write_all(b"\"V84.").unwrap();
        conn.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
        conn.write_all(b"20.18Z\"").unwrap();
        let _ = conn.read(&mut buf);
    });

    let address = format!("127.0.0.1:{}", port);
    let config = ConnectionConfig::from_path(Some(address.as_str()))
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let mut dev = ZebraDevice::from_config(&config);
    let version = dev.session(|d| d.getvar("appl.name")).unwrap();
    assert_eq!(version, "V84.20.18Z");

    printer.join().unwrap();
}
