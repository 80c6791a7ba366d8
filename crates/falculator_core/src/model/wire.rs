//! Wire-format support for config enums.
//!
//! Enums serialize by symbolic name. Documents written by older releases
//! carried bare integer codes instead; those are still accepted on read, so
//! every wire enum declares its legacy code table alongside the variants.
//! An optional `as "Name"` clause pins the wire spelling where the Rust
//! identifier can't match it (`Self` is reserved).

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident $(as $alias:literal)? = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Integer code used by legacy documents.
            pub fn legacy_code(self) -> i64 {
                match self { $( Self::$variant => $code ),+ }
            }

            /// Canonical wire spelling.
            pub fn wire_name(self) -> &'static str {
                match self { $( Self::$variant => wire_enum!(@name $variant $(, $alias)?) ),+ }
            }

            fn from_legacy_code(code: i64) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn from_wire_name(name: &str) -> Option<Self> {
                $(
                    if name == wire_enum!(@name $variant $(, $alias)?)
                        || name == stringify!($variant)
                    {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.wire_name())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                struct WireVisitor;

                impl<'de> ::serde::de::Visitor<'de> for WireVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                        write!(
                            f,
                            concat!("a ", stringify!($name), " name or legacy integer code")
                        )
                    }

                    fn visit_str<E>(self, v: &str) -> ::std::result::Result<$name, E>
                    where
                        E: ::serde::de::Error,
                    {
                        $name::from_wire_name(v).ok_or_else(|| {
                            E::unknown_variant(v, &[$(wire_enum!(@name $variant $(, $alias)?)),+])
                        })
                    }

                    fn visit_i64<E>(self, v: i64) -> ::std::result::Result<$name, E>
                    where
                        E: ::serde::de::Error,
                    {
                        $name::from_legacy_code(v).ok_or_else(|| {
                            E::custom(format!(
                                concat!("unknown ", stringify!($name), " code {}"),
                                v
                            ))
                        })
                    }

                    fn visit_u64<E>(self, v: u64) -> ::std::result::Result<$name, E>
                    where
                        E: ::serde::de::Error,
                    {
                        self.visit_i64(v as i64)
                    }
                }

                deserializer.deserialize_any(WireVisitor)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.wire_name())
            }
        }
    };

    (@name $variant:ident) => { stringify!($variant) };
    (@name $variant:ident, $alias:literal) => { $alias };
}

pub(crate) use wire_enum;
