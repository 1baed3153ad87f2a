//! Variant containers
//!
//! Upstream models `Update` and `Message` as records with dozens of optional
//! fields of which at most one is set. Here each such bundle is one closed
//! enum generated from a single table of `Variant(Payload) = "wire_field"`
//! rows. The row order is the upstream declaration order and decides which
//! field wins when a payload sets more than one.
//!
//! The enum serializes as a map with zero or one entry, so it is meant to be
//! `#[serde(flatten)]`-ed into the record that owns the envelope fields.
//! An optional `companions` block names fields that upstream always sends
//! next to a variant; they are rebuilt from the payload when encoding and
//! ignored when decoding.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! variant_container {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($payload:ty) = $field:literal,
            )+
        }
        $(
            companions {
                $( $cvariant:ident($cbind:ident) => $cfield:literal: $cexpr:expr, )+
            }
        )?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant($payload),
            )+
            /// No recognised variant field was populated
            Unknown,
        }

        impl $name {
            /// Variant field names in upstream declaration order
            pub const FIELDS: &'static [&'static str] = &[$($field),+];

            /// Wire field carrying this variant, `None` for `Unknown`
            pub fn field_name(&self) -> Option<&'static str> {
                match self {
                    $( Self::$variant(_) => Some($field), )+
                    Self::Unknown => None,
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown)
            }

            /// Build the variant stored under `field`; `None` if `field` is
            /// not one of [`Self::FIELDS`]
            pub fn from_field(
                field: &str,
                value: serde_json::Value,
            ) -> Option<Result<Self, serde_json::Error>> {
                match field {
                    $( $field => Some(serde_json::from_value(value).map(Self::$variant)), )+
                    _ => None,
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use serde::ser::SerializeMap;

                let mut map = serializer.serialize_map(None)?;
                match self {
                    $( Self::$variant(payload) => map.serialize_entry($field, payload)?, )+
                    Self::Unknown => {}
                }
                $($(
                    if let Self::$cvariant($cbind) = self {
                        map.serialize_entry($cfield, &$cexpr)?;
                    }
                )+)?
                map.end()
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                use serde::de::Error as _;

                let mut fields = <serde_json::Map<String, serde_json::Value> as serde::Deserialize>::deserialize(
                    deserializer,
                )?;
                for name in Self::FIELDS {
                    let value = match fields.remove(*name) {
                        None | Some(serde_json::Value::Null) => continue,
                        Some(value) => value,
                    };
                    if let Some(result) = Self::from_field(name, value) {
                        return result.map_err(|e| D::Error::custom(format!("{name}: {e}")));
                    }
                }
                Ok(Self::Unknown)
            }
        }
    };
}

/// Marker for upstream fields of type `True`: present means `true`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct True;

impl Serialize for True {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for True {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(True)
        } else {
            Err(serde::de::Error::custom("expected `true`"))
        }
    }
}
