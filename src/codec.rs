//! Compact, size-bounded serialization for interactive-button callback
//! payloads: `<prefix><sep><field>...`, capped at [`PAYLOAD_MAX`] encoded
//! bytes.

use crate::errors::CodecError;

/// Maximum encoded payload size, in UTF-8 bytes. The platform enforces
/// this on the button payload it will accept.
pub const PAYLOAD_MAX: usize = 1024;

/// Default separator between prefix and fields, and between fields.
pub const DEFAULT_SEPARATOR: &str = "|";

/// Implemented by types that can round-trip through a button callback's
/// `payload` string.
///
/// Implementations are generated by [`callback_payload!`] rather than
/// written by hand.
pub trait CallbackPayload: Sized {
    /// The tag every encoded instance starts with. Defaults to the type
    /// name if a `callback_payload!` invocation doesn't override it.
    const PREFIX: &'static str;
    /// The separator between the prefix and each field, and between
    /// fields. Must not appear in any field's encoded value.
    const SEPARATOR: &'static str = DEFAULT_SEPARATOR;

    /// Encode `self` into the wire string.
    ///
    /// # Errors
    /// [`CodecError::SeparatorInValue`] if a field's `Display` output
    /// contains [`Self::SEPARATOR`]; [`CodecError::TooLong`] if the
    /// encoded result exceeds [`PAYLOAD_MAX`] bytes.
    fn encode(&self) -> Result<String, CodecError>;

    /// Decode a wire string produced by [`Self::encode`].
    ///
    /// # Errors
    /// [`CodecError::PrefixMismatch`] if `data` doesn't start with
    /// [`Self::PREFIX`]; [`CodecError::FieldCountMismatch`] if the field
    /// count doesn't match; [`CodecError::FieldParse`] if a field fails to
    /// parse into its declared type.
    fn decode(data: &str) -> Result<Self, CodecError>;
}

/// Joins `prefix` and `fields` with `separator`, checking the separator
/// doesn't appear in any field and the result doesn't exceed
/// [`PAYLOAD_MAX`]. Shared by every `callback_payload!`-generated `encode`.
///
/// # Errors
/// See [`CallbackPayload::encode`].
pub fn pack(
    prefix: &str,
    separator: &'static str,
    fields: &[(&'static str, String)],
) -> Result<String, CodecError> {
    let mut parts = Vec::with_capacity(fields.len() + 1);
    parts.push(prefix.to_owned());

    for (name, value) in fields {
        if value.contains(separator) {
            return Err(CodecError::SeparatorInValue {
                field: name,
                separator,
            });
        }
        parts.push(value.clone());
    }

    let data = parts.join(separator);
    if data.len() > PAYLOAD_MAX {
        return Err(CodecError::TooLong {
            size: data.len(),
            max: PAYLOAD_MAX,
        });
    }

    Ok(data)
}

/// Splits `data` on `separator`, checks the prefix and field count, and
/// returns the raw field strings for the macro-generated `decode` to parse.
///
/// # Errors
/// See [`CallbackPayload::decode`].
pub fn unpack<'a>(
    data: &'a str,
    prefix: &str,
    separator: &str,
    expected_fields: usize,
) -> Result<Vec<&'a str>, CodecError> {
    let mut parts = data.split(separator);

    let got_prefix = parts.next().unwrap_or("");
    if got_prefix != prefix {
        return Err(CodecError::PrefixMismatch {
            expected: prefix.to_owned(),
            got: got_prefix.to_owned(),
        });
    }

    let fields: Vec<&str> = parts.collect();
    if fields.len() != expected_fields {
        return Err(CodecError::FieldCountMismatch {
            expected: expected_fields,
            got: fields.len(),
        });
    }

    Ok(fields)
}

/// One wire-format field of a `callback_payload!` struct: encodes to, and
/// parses back from, a single `SEPARATOR`-delimited token.
///
/// `Option<T>` gets a dedicated impl so a `None` field round-trips as the
/// empty string rather than requiring `T: Display`/`FromStr` on `Option<T>`
/// itself — the same convention as the reference implementation's
/// `callback_payload.py` (`"" if value is None else str(value)`).
pub trait CallbackField: Sized {
    fn encode_field(&self) -> String;

    /// # Errors
    /// Any error `Self`'s parser reports; wrapped into a
    /// [`CodecError::FieldParse`] by the calling `decode`.
    fn decode_field(raw: &str) -> Result<Self, anyhow::Error>;
}

macro_rules! impl_callback_field_for_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CallbackField for $ty {
                fn encode_field(&self) -> String {
                    self.to_string()
                }

                fn decode_field(raw: &str) -> Result<Self, anyhow::Error> {
                    raw.parse::<$ty>().map_err(|e| anyhow::anyhow!(e.to_string()))
                }
            }
        )*
    };
}

impl_callback_field_for_display!(
    String, bool, char, f32, f64, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
);

impl<T: CallbackField> CallbackField for Option<T> {
    fn encode_field(&self) -> String {
        match self {
            Some(value) => value.encode_field(),
            None => String::new(),
        }
    }

    fn decode_field(raw: &str) -> Result<Self, anyhow::Error> {
        if raw.is_empty() {
            Ok(None)
        } else {
            T::decode_field(raw).map(Some)
        }
    }
}

/// Generates a [`CallbackPayload`] impl for a plain struct of
/// [`CallbackField`] fields (every `Display`/`FromStr` primitive, plus
/// `Option<T>` for any such `T`).
///
/// ```ignore
/// callback_payload! {
///     struct ConfirmOrder {
///         order_id: u64,
///         confirm: bool,
///         note: Option<String>,
///     }
/// }
/// ```
///
/// expands to a struct plus a `CallbackPayload` impl whose `PREFIX`
/// defaults to the struct name (override with `prefix = "..."`) and whose
/// `SEPARATOR` defaults to `"|"` (override with `separator = "..."`).
#[macro_export]
macro_rules! callback_payload {
    (
        $(#[$meta:meta])*
        struct $name:ident $(prefix = $prefix:literal)? $(separator = $separator:literal)? {
            $($field:ident: $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: $ty),*
        }

        impl $crate::codec::CallbackPayload for $name {
            const PREFIX: &'static str = $crate::callback_payload!(@prefix $name $(, $prefix)?);
            $(const SEPARATOR: &'static str = $separator;)?

            fn encode(&self) -> Result<String, $crate::errors::CodecError> {
                $crate::codec::pack(
                    Self::PREFIX,
                    Self::SEPARATOR,
                    &[$((stringify!($field), $crate::codec::CallbackField::encode_field(&self.$field))),*],
                )
            }

            fn decode(data: &str) -> Result<Self, $crate::errors::CodecError> {
                #[allow(unused_variables, unused_mut)]
                let mut fields = $crate::codec::unpack(
                    data,
                    Self::PREFIX,
                    Self::SEPARATOR,
                    $crate::callback_payload!(@count $($field)*),
                )?.into_iter();

                Ok(Self {
                    $(
                        $field: {
                            let raw = fields.next().expect("field count already validated");
                            <$ty as $crate::codec::CallbackField>::decode_field(raw).map_err(|e| {
                                $crate::errors::CodecError::FieldParse {
                                    field: stringify!($field),
                                    source: e,
                                }
                            })?
                        }
                    ),*
                })
            }
        }

        // Lets the handler declare this payload type directly as an argument; the
        // matching `ProvidePayload` middleware is what puts one in the request
        // context in the first place (see `crate::middlewares::ProvidePayload`).
        impl<S> $crate::extractors::FromEventAndContext<S> for $name
        where
            S: Send + Sync + 'static,
        {
            type Error = $crate::errors::ExtractorError;

            fn extract(
                _bot: ::std::sync::Arc<$crate::client::Bot<S>>,
                _update: ::std::sync::Arc<$crate::types::Update>,
                context: ::std::sync::Arc<::std::sync::Mutex<$crate::context::Context>>,
            ) -> Result<Self, Self::Error> {
                context
                    .lock()
                    .unwrap_or_else(::std::sync::PoisonError::into_inner)
                    .get_cloned::<$name>()
                    .ok_or_else(|| {
                        $crate::errors::ExtractorError::new(concat!(
                            "no `",
                            stringify!($name),
                            "` in the request context; attach a ProvidePayload middleware for it"
                        ))
                    })
            }
        }
    };

    (@prefix $name:ident, $prefix:literal) => { $prefix };
    (@prefix $name:ident) => { stringify!($name) };
    (@count) => { 0 };
    (@count $head:ident $($tail:ident)*) => { 1 + $crate::callback_payload!(@count $($tail)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    callback_payload! {
        struct ConfirmOrder {
            order_id: u64,
            confirm: bool,
        }
    }

    callback_payload! {
        struct Paginate prefix = "pg" separator = ":" {
            page: u32,
        }
    }

    callback_payload! {
        struct EditNote {
            note_id: u64,
            body: Option<String>,
        }
    }

    #[test]
    fn default_prefix_is_type_name() {
        assert_eq!(ConfirmOrder::PREFIX, "ConfirmOrder");
    }

    #[test]
    fn round_trips() {
        let original = ConfirmOrder {
            order_id: 42,
            confirm: true,
        };
        let encoded = original.encode().unwrap();
        assert_eq!(encoded, "ConfirmOrder|42|true");
        assert_eq!(ConfirmOrder::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn custom_prefix_and_separator() {
        let original = Paginate { page: 3 };
        let encoded = original.encode().unwrap();
        assert_eq!(encoded, "pg:3");
        assert_eq!(Paginate::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn wrong_prefix_is_rejected() {
        assert!(matches!(
            ConfirmOrder::decode("OtherPrefix|1|true"),
            Err(CodecError::PrefixMismatch { .. })
        ));
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert!(matches!(
            ConfirmOrder::decode("ConfirmOrder|1"),
            Err(CodecError::FieldCountMismatch { .. })
        ));
    }

    #[test]
    fn none_field_encodes_as_empty_string() {
        let original = EditNote {
            note_id: 7,
            body: None,
        };
        let encoded = original.encode().unwrap();
        assert_eq!(encoded, "EditNote|7|");
        assert_eq!(EditNote::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn some_field_round_trips() {
        let original = EditNote {
            note_id: 7,
            body: Some("hi".to_owned()),
        };
        let encoded = original.encode().unwrap();
        assert_eq!(encoded, "EditNote|7|hi");
        assert_eq!(EditNote::decode(&encoded).unwrap(), original);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let original = ConfirmOrder {
            order_id: 0,
            confirm: true,
        };
        // Sanity-checks the bound itself rather than a realistic payload.
        let huge = "x".repeat(PAYLOAD_MAX + 1);
        assert!(matches!(
            pack("p", "|", &[("field", huge)]),
            Err(CodecError::TooLong { .. })
        ));
        let _ = original;
    }
}
