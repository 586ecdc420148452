//! # Variable Namespace
//!
//! Typed accessors mirroring the printer's variable tree:
//!
//! ```text
//! appl.name                         text, read-only
//! device.friendly_name              text
//! device.unique_id                  text, read-only
//! ip.dhcp.enable                    on/off
//! ip.dhcp.cid_type                  integer
//! wlan.allowed_band                 text
//! wlan.country_code                 text
//! wlan.encryption_mode              on/off
//! wlan.essid                        text
//! wlan.international_mode           on/off
//! wlan.mac_addr                     text, read-only
//! wlan.operating_mode               text
//! wlan.power_save                   on/off
//! wlan.signal_strength              integer, read-only
//! wlan.ip.addr                      IPv4
//! wlan.ip.protocol                  text
//! wlan.wpa.authentication           text
//! wlan.wpa.enable                   on/off
//! wlan.wpa.psk                      text
//! ```

use super::codec::{Integer, Ipv4, OnOff, Text};
use super::field::{Block, Field, VarStore};
use super::wpa::derive_psk;
use crate::error::ZebraError;

/// Root of the variable namespace.
///
/// ```
/// use zebconf::schema::ConfigRoot;
///
/// let config = ConfigRoot::new();
/// assert_eq!(config.wlan().wpa().psk().name(), "wlan.wpa.psk");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigRoot {
    block: Block,
}

impl ConfigRoot {
    pub fn new() -> Self {
        Self {
            block: Block::root(),
        }
    }

    pub fn appl(&self) -> ApplConfig {
        ApplConfig {
            block: self.block.child("appl"),
        }
    }

    pub fn device(&self) -> DeviceConfig {
        DeviceConfig {
            block: self.block.child("device"),
        }
    }

    pub fn ip(&self) -> IpConfig {
        IpConfig {
            block: self.block.child("ip"),
        }
    }

    pub fn wlan(&self) -> WlanConfig {
        WlanConfig {
            block: self.block.child("wlan"),
        }
    }
}

/// `appl.*`: firmware application
#[derive(Debug, Clone)]
pub struct ApplConfig {
    block: Block,
}

impl ApplConfig {
    /// Firmware version string
    pub fn name(&self) -> Field<Text> {
        self.block.readonly_field("name")
    }
}

/// `device.*`
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    block: Block,
}

impl DeviceConfig {
    pub fn friendly_name(&self) -> Field<Text> {
        self.block.field("friendly_name")
    }

    pub fn unique_id(&self) -> Field<Text> {
        self.block.readonly_field("unique_id")
    }
}

/// `ip.*`
#[derive(Debug, Clone)]
pub struct IpConfig {
    block: Block,
}

impl IpConfig {
    pub fn dhcp(&self) -> IpDhcpConfig {
        IpDhcpConfig {
            block: self.block.child("dhcp"),
        }
    }
}

/// `ip.dhcp.*`
#[derive(Debug, Clone)]
pub struct IpDhcpConfig {
    block: Block,
}

impl IpDhcpConfig {
    pub fn enable(&self) -> Field<OnOff> {
        self.block.field("enable")
    }

    pub fn cid_type(&self) -> Field<Integer> {
        self.block.field("cid_type")
    }
}

/// `wlan.*`
#[derive(Debug, Clone)]
pub struct WlanConfig {
    block: Block,
}

impl WlanConfig {
    pub fn ip(&self) -> WlanIpConfig {
        WlanIpConfig {
            block: self.block.child("ip"),
        }
    }

    pub fn wpa(&self) -> WlanWpaConfig {
        WlanWpaConfig {
            block: self.block.child("wpa"),
        }
    }

    pub fn allowed_band(&self) -> Field<Text> {
        self.block.field("allowed_band")
    }

    pub fn country_code(&self) -> Field<Text> {
        self.block.field("country_code")
    }

    pub fn encryption_mode(&self) -> Field<OnOff> {
        self.block.field("encryption_mode")
    }

    pub fn essid(&self) -> Field<Text> {
        self.block.field("essid")
    }

    pub fn international_mode(&self) -> Field<OnOff> {
        self.block.field("international_mode")
    }

    pub fn mac_addr(&self) -> Field<Text> {
        self.block.readonly_field("mac_addr")
    }

    pub fn operating_mode(&self) -> Field<Text> {
        self.block.field("operating_mode")
    }

    pub fn power_save(&self) -> Field<OnOff> {
        self.block.field("power_save")
    }

    pub fn signal_strength(&self) -> Field<Integer> {
        self.block.readonly_field("signal_strength")
    }

    /// Configure WPA-PSK for the ESSID currently set on the device.
    pub fn set_wpa_psk<S: VarStore + ?Sized>(
        &self,
        store: &mut S,
        passphrase: &str,
    ) -> Result<(), ZebraError> {
        let essid = self.essid().get(store)?;
        self.wpa().set_psk(store, &essid, passphrase)
    }
}

/// `wlan.ip.*`
#[derive(Debug, Clone)]
pub struct WlanIpConfig {
    block: Block,
}

impl WlanIpConfig {
    pub fn addr(&self) -> Field<Ipv4> {
        self.block.field("addr")
    }

    pub fn protocol(&self) -> Field<Text> {
        self.block.field("protocol")
    }
}

/// `wlan.wpa.*`
#[derive(Debug, Clone)]
pub struct WlanWpaConfig {
    block: Block,
}

impl WlanWpaConfig {
    pub fn authentication(&self) -> Field<Text> {
        self.block.field("authentication")
    }

    pub fn enable(&self) -> Field<OnOff> {
        self.block.field("enable")
    }

    pub fn psk(&self) -> Field<Text> {
        self.block.field("psk")
    }

    /// Enable WPA with a pre-shared key derived from `essid` and `passphrase`.
    ///
    /// Writes `wlan.wpa.enable`, `wlan.wpa.authentication` and
    /// `wlan.wpa.psk`, in that order.
    pub fn set_psk<S: VarStore + ?Sized>(
        &self,
        store: &mut S,
        essid: &str,
        passphrase: &str,
    ) -> Result<(), ZebraError> {
        let psk = derive_psk(essid, passphrase);
        self.enable().set(store, true)?;
        self.authentication().set(store, "psk")?;
        self.psk().set(store, psk)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::field::tests::MapStore;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    #[test]
    fn test_names_follow_the_device_tree() {
        let config = ConfigRoot::new();
        let names = [
            config.appl().name().name().to_string(),
            config.device().friendly_name().name().to_string(),
            config.device().unique_id().name().to_string(),
            config.ip().dhcp().enable().name().to_string(),
            config.ip().dhcp().cid_type().name().to_string(),
            config.wlan().essid().name().to_string(),
            config.wlan().country_code().name().to_string(),
            config.wlan().allowed_band().name().to_string(),
            config.wlan().operating_mode().name().to_string(),
            config.wlan().encryption_mode().name().to_string(),
            config.wlan().international_mode().name().to_string(),
            config.wlan().power_save().name().to_string(),
            config.wlan().mac_addr().name().to_string(),
            config.wlan().signal_strength().name().to_string(),
            config.wlan().ip().addr().name().to_string(),
            config.wlan().ip().protocol().name().to_string(),
            config.wlan().wpa().enable().name().to_string(),
            config.wlan().wpa().authentication().name().to_string(),
            config.wlan().wpa().psk().name().to_string(),
        ];
        assert_eq!(
            names,
            [
                "appl.name",
                "device.friendly_name",
                "device.unique_id",
                "ip.dhcp.enable",
                "ip.dhcp.cid_type",
                "wlan.essid",
                "wlan.country_code",
                "wlan.allowed_band",
                "wlan.operating_mode",
                "wlan.encryption_mode",
                "wlan.international_mode",
                "wlan.power_save",
                "wlan.mac_addr",
                "wlan.signal_strength",
                "wlan.ip.addr",
                "wlan.ip.protocol",
                "wlan.wpa.enable",
                "wlan.wpa.authentication",
                "wlan.wpa.psk",
            ]
        );
    }

    #[test]
    fn test_readonly_leaves() {
        let config = ConfigRoot::new();
        assert!(config.appl().name().is_readonly());
        assert!(config.device().unique_id().is_readonly());
        assert!(config.wlan().mac_addr().is_readonly());
        assert!(config.wlan().signal_strength().is_readonly());
        assert!(!config.wlan().essid().is_readonly());

        let mut store = MapStore::default();
        assert!(matches!(
            config.wlan().signal_strength().set(&mut store, 80),
            Err(ZebraError::ReadOnlyVariable(_))
        ));
    }

    #[test]
    fn test_typed_reads() {
        let mut store = MapStore::with(&[
            ("ip.dhcp.enable", "on"),
            ("ip.dhcp.cid_type", "1"),
            ("wlan.ip.addr", "10.1.2.3"),
            ("wlan.signal_strength", "74"),
        ]);
        let config = ConfigRoot::new();
        assert!(config.ip().dhcp().enable().get(&mut store).unwrap());
        assert_eq!(config.ip().dhcp().cid_type().get(&mut store).unwrap(), 1);
        assert_eq!(
            config.wlan().ip().addr().get(&mut store).unwrap(),
            Ipv4Addr::new(10, 1, 2, 3)
        );
        assert_eq!(config.wlan().signal_strength().get(&mut store).unwrap(), 74);
    }

    #[test]
    fn test_typed_writes() {
        let mut store = MapStore::default();
        let config = ConfigRoot::new();
        config.ip().dhcp().enable().set(&mut store, false).unwrap();
        config
            .wlan()
            .ip()
            .addr()
            .set(&mut store, Ipv4Addr::new(192, 168, 0, 9))
            .unwrap();
        assert_eq!(store.vars["ip.dhcp.enable"], "off");
        assert_eq!(store.vars["wlan.ip.addr"], "192.168.0.9");
    }

    #[test]
    fn test_set_psk_writes_enable_auth_key() {
        let mut store = MapStore::default();
        ConfigRoot::new()
            .wlan()
            .wpa()
            .set_psk(&mut store, "TestNet", "hunter2")
            .unwrap();
        assert_eq!(
            store.writes,
            vec![
                ("wlan.wpa.enable".to_string(), "on".to_string()),
                ("wlan.wpa.authentication".to_string(), "psk".to_string()),
                (
                    "wlan.wpa.psk".to_string(),
                    "5DDBC5E0FD19D7919A86C9652E4996C03C75C8016E5FBD52DB0E89ED12CED7B4".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_set_wpa_psk_uses_stored_essid() {
        let mut store = MapStore::with(&[("wlan.essid", "IEEE")]);
        ConfigRoot::new()
            .wlan()
            .set_wpa_psk(&mut store, "password")
            .unwrap();
        assert_eq!(
            store.vars["wlan.wpa.psk"],
            "F42C6FC52DF0EBEF9EBB4B90B38A5F902E83FE1B135A70E23AED762E9710A12E"
        );
    }

    #[test]
    fn test_set_wpa_psk_without_essid_fails() {
        let mut store = MapStore::default();
        let err = ConfigRoot::new()
            .wlan()
            .set_wpa_psk(&mut store, "password")
            .unwrap_err();
        assert!(matches!(err, ZebraError::UnknownVariable(ref n) if n == "wlan.essid"));
        assert!(store.writes.is_empty());
    }
}
