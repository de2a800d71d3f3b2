/// Defines a closed technology enumeration with a trailing `Unknown` variant.
///
/// Each variant gets a stable wire name (used for serde and `Display`) and a
/// human-readable label. `Unknown` serializes as `"unknown"`.
#[macro_export]
macro_rules! define_technology_enum {
    (
        $(#[$enum_meta:meta])*
        $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire_name:literal : $display_name:literal
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
            Unknown,
        }

        impl serde::Serialize for $enum_name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok(Self::from_wire(&s).unwrap_or(Self::Unknown))
            }
        }

        impl $enum_name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $wire_name,
                    )*
                    Self::Unknown => "unknown",
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant => $display_name,
                    )*
                    Self::Unknown => "Unknown",
                }
            }

            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $(
                        $wire_name => Some(Self::$variant),
                    )*
                    "unknown" => Some(Self::Unknown),
                    _ => None,
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, Self::Unknown)
            }

            /// All known variants, excluding `Unknown`
            pub fn all_known() -> &'static [Self] {
                &[
                    $(
                        Self::$variant,
                    )*
                ]
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
