//! # Fields and Namespace Blocks
//!
//! A [`Field`] is a typed handle on one dotted variable name. A [`Block`]
//! is a dotted prefix that hands out child blocks and fields. Neither holds
//! a value: every `get`/`set` goes straight to the [`VarStore`].

use std::fmt;
use std::marker::PhantomData;

use super::codec::Codec;
use crate::error::ZebraError;

/// Raw string access to the device's variable namespace.
pub trait VarStore {
    fn getvar(&mut self, name: &str) -> Result<String, ZebraError>;
    fn setvar(&mut self, name: &str, value: &str) -> Result<(), ZebraError>;
}

/// A typed configuration variable.
pub struct Field<C: Codec> {
    name: String,
    readonly: bool,
    codec: PhantomData<C>,
}

impl<C: Codec> Field<C> {
    /// A writable variable with the full dotted `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            readonly: false,
            codec: PhantomData,
        }
    }

    /// A variable that may only be read.
    pub fn readonly(name: impl Into<String>) -> Self {
        Self {
            readonly: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Fetch and decode the current value.
    pub fn get<S: VarStore + ?Sized>(&self, store: &mut S) -> Result<C::Value, ZebraError> {
        let raw = store.getvar(&self.name)?;
        C::decode(&self.name, &raw)
    }

    /// Encode and store a value.
    pub fn set<S, V>(&self, store: &mut S, value: V) -> Result<(), ZebraError>
    where
        S: VarStore + ?Sized,
        V: Into<C::Value>,
    {
        if self.readonly {
            return Err(ZebraError::ReadOnlyVariable(self.name.clone()));
        }
        store.setvar(&self.name, &C::encode(&value.into()))
    }
}

impl<C: Codec> fmt::Debug for Field<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("readonly", &self.readonly)
            .finish()
    }
}

/// A dotted prefix in the variable namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    prefix: String,
}

impl Block {
    /// The unnamed root of the namespace.
    pub fn root() -> Self {
        Self::default()
    }

    /// The block `<self>.<key>`.
    pub fn child(&self, key: &str) -> Self {
        Self {
            prefix: format!("{}{}.", self.prefix, key),
        }
    }

    /// Full dotted name of `key` inside this block.
    pub fn name(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn field<C: Codec>(&self, key: &str) -> Field<C> {
        Field::new(self.name(key))
    }

    pub fn readonly_field<C: Codec>(&self, key: &str) -> Field<C> {
        Field::readonly(self.name(key))
    }

    /// Untyped read of `key` inside this block.
    pub fn get<S: VarStore + ?Sized>(&self, store: &mut S, key: &str) -> Result<String, ZebraError> {
        store.getvar(&self.name(key))
    }

    /// Untyped write of `key` inside this block.
    pub fn set<S: VarStore + ?Sized>(
        &self,
        store: &mut S,
        key: &str,
        value: &str,
    ) -> Result<(), ZebraError> {
        store.setvar(&self.name(key), value)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::codec::{Integer, OnOff, Text};
    use std::collections::HashMap;

    /// Variable table that behaves like a device: unknown names fail.
    #[derive(Debug, Default)]
    pub(crate) struct MapStore {
        pub vars: HashMap<String, String>,
        pub writes: Vec<(String, String)>,
    }

    impl MapStore {
        pub fn with(vars: &[(&str, &str)]) -> Self {
            Self {
                vars: vars
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                writes: Vec::new(),
            }
        }
    }

    impl VarStore for MapStore {
        fn getvar(&mut self, name: &str) -> Result<String, ZebraError> {
            self.vars
                .get(name)
                .cloned()
                .ok_or_else(|| ZebraError::UnknownVariable(name.to_string()))
        }

        fn setvar(&mut self, name: &str, value: &str) -> Result<(), ZebraError> {
            self.writes.push((name.to_string(), value.to_string()));
            self.vars.insert(name.to_string(), value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_block_names() {
        let wlan = Block::root().child("wlan");
        assert_eq!(wlan.name("essid"), "wlan.essid");
        assert_eq!(wlan.child("wpa").name("psk"), "wlan.wpa.psk");
        assert_eq!(Block::root().name("appl"), "appl");
    }

    #[test]
    fn test_field_get_set_round_trip() {
        let mut store = MapStore::default();
        let field: Field<Integer> = Block::root().child("ip").child("dhcp").field("cid_type");

        field.set(&mut store, 1).unwrap();
        assert_eq!(store.vars["ip.dhcp.cid_type"], "1");
        assert_eq!(field.get(&mut store).unwrap(), 1);

        field.set(&mut store, 3).unwrap();
        assert_eq!(field.get(&mut store).unwrap(), 3);
    }

    #[test]
    fn test_text_field_accepts_str() {
        let mut store = MapStore::default();
        let field: Field<Text> = Field::new("device.friendly_name");
        field.set(&mut store, "Shipping").unwrap();
        assert_eq!(field.get(&mut store).unwrap(), "Shipping");
    }

    #[test]
    fn test_readonly_field_rejects_writes() {
        let mut store = MapStore::with(&[("appl.name", "V84.20.18Z")]);
        let field: Field<Text> = Field::readonly("appl.name");

        assert_eq!(field.get(&mut store).unwrap(), "V84.20.18Z");
        let err = field.set(&mut store, "V1").unwrap_err();
        assert!(matches!(err, ZebraError::ReadOnlyVariable(ref n) if n == "appl.name"));
        assert!(store.writes.is_empty());
    }

    #[test]
    fn test_decode_failure_is_value_error() {
        let mut store = MapStore::with(&[("wlan.power_save", "maybe")]);
        let field: Field<OnOff> = Field::new("wlan.power_save");
        assert!(matches!(field.get(&mut store), Err(ZebraError::Value(_))));
    }

    #[test]
    fn test_unknown_variable_propagates() {
        let mut store = MapStore::default();
        let field: Field<OnOff> = Field::new("wlan.power_save");
        assert!(matches!(
            field.get(&mut store),
            Err(ZebraError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_untyped_block_access() {
        let mut store = MapStore::default();
        let wlan = Block::root().child("wlan");
        wlan.set(&mut store, "essid", "TestNet").unwrap();
        assert_eq!(wlan.get(&mut store, "essid").unwrap(), "TestNet");
    }
}
