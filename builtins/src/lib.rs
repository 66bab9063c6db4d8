pub mod meta;

use std::string::String as StdString;

use meta::lexical;

macro_rules! primitive_types {
    ($($xs_name:literal => $name:ident($whitespace:ident, $check:path);)*) => {
        $(
            #[doc = concat!("Value of the builtin datatype `xs:", $xs_name, "`")]
            #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
            pub struct $name(pub StdString);

            impl $name {
                pub const XS_NAME: &'static str = $xs_name;
                pub const FACET_WHITE_SPACE: meta::Whitespace = meta::Whitespace::$whitespace;

                pub fn from_literal(literal: &str) -> Result<Self, meta::Error> {
                    let normalized = meta::normalized_value(literal, Self::FACET_WHITE_SPACE);
                    if $check(&normalized) {
                        Ok(Self(normalized.into_owned()))
                    } else {
                        Err(meta::Error::InvalidLexicalForm {
                            type_name: $xs_name,
                            value: literal.to_string(),
                        })
                    }
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*

        /// Builtin datatype names (local part, in the XSD namespace) and the wrapper type
        /// representing each of them.
        pub const PRIMITIVES: &[(&str, &str)] = &[$(($xs_name, stringify!($name))),*];
    };
}

primitive_types! {
    "anyType" => AnyType(Preserve, lexical::any);
    "anySimpleType" => AnySimpleType(Preserve, lexical::any);
    "string" => StringPrimitive(Preserve, lexical::any);
    "normalizedString" => NormalizedStringPrimitive(Replace, lexical::any);
    "token" => TokenPrimitive(Collapse, lexical::any);
    "language" => LanguagePrimitive(Collapse, lexical::language);
    "NMTOKEN" => NmTokenPrimitive(Collapse, lexical::nmtoken);
    "NMTOKENS" => NmTokensPrimitive(Collapse, lexical::nmtokens);
    "Name" => NamePrimitive(Collapse, lexical::name);
    "NCName" => NcNamePrimitive(Collapse, lexical::ncname);
    "ID" => IdPrimitive(Collapse, lexical::ncname);
    "IDREF" => IdRefPrimitive(Collapse, lexical::ncname);
    "IDREFS" => IdRefsPrimitive(Collapse, lexical::ncnames);
    "ENTITY" => EntityPrimitive(Collapse, lexical::ncname);
    "ENTITIES" => EntitiesPrimitive(Collapse, lexical::ncnames);
    "QName" => QNamePrimitive(Collapse, lexical::qname);
    "NOTATION" => NotationPrimitive(Collapse, lexical::qname);
    "anyURI" => AnyUriPrimitive(Collapse, lexical::any);
    "boolean" => BooleanPrimitive(Collapse, lexical::boolean);
    "decimal" => DecimalPrimitive(Collapse, lexical::decimal);
    "float" => FloatPrimitive(Collapse, lexical::float);
    "double" => DoublePrimitive(Collapse, lexical::float);
    "integer" => IntegerPrimitive(Collapse, lexical::integer);
    "nonPositiveInteger" => NonPositiveIntegerPrimitive(Collapse, lexical::non_positive_integer);
    "negativeInteger" => NegativeIntegerPrimitive(Collapse, lexical::negative_integer);
    "nonNegativeInteger" => NonNegativeIntegerPrimitive(Collapse, lexical::non_negative_integer);
    "positiveInteger" => PositiveIntegerPrimitive(Collapse, lexical::positive_integer);
    "long" => LongPrimitive(Collapse, lexical::long);
    "int" => IntPrimitive(Collapse, lexical::int);
    "short" => ShortPrimitive(Collapse, lexical::short);
    "byte" => BytePrimitive(Collapse, lexical::byte);
    "unsignedLong" => UnsignedLongPrimitive(Collapse, lexical::unsigned_long);
    "unsignedInt" => UnsignedIntPrimitive(Collapse, lexical::unsigned_int);
    "unsignedShort" => UnsignedShortPrimitive(Collapse, lexical::unsigned_short);
    "unsignedByte" => UnsignedBytePrimitive(Collapse, lexical::unsigned_byte);
    "duration" => DurationPrimitive(Collapse, lexical::duration);
    "dateTime" => DateTimePrimitive(Collapse, lexical::date_time);
    "dateTimeStamp" => DateTimeStampPrimitive(Collapse, lexical::date_time_stamp);
    "time" => TimePrimitive(Collapse, lexical::time);
    "date" => DatePrimitive(Collapse, lexical::date);
    "gYearMonth" => GYearMonthPrimitive(Collapse, lexical::g_year_month);
    "gYear" => GYearPrimitive(Collapse, lexical::g_year);
    "gMonthDay" => GMonthDayPrimitive(Collapse, lexical::g_month_day);
    "gDay" => GDayPrimitive(Collapse, lexical::g_day);
    "gMonth" => GMonthPrimitive(Collapse, lexical::g_month);
    "hexBinary" => HexBinaryPrimitive(Collapse, lexical::hex_binary);
    "base64Binary" => Base64BinaryPrimitive(Collapse, lexical::base64_binary);
}

impl BooleanPrimitive {
    pub fn value(&self) -> bool {
        matches!(self.0.as_str(), "true" | "1")
    }
}
