/// 금액 처리 유틸리티
/// 모든 금액은 최소 화폐 단위(cents)의 정수로 다루고, 외부 경계에서는 10진수 문자열로 주고받는다.
// region:    --- Imports
use serde::de::{self, Visitor};
use std::fmt;

// endregion: --- Imports

/// 기본 통화 코드
pub const DEFAULT_CURRENCY: &str = "VND";

// region:    --- Parsing & Formatting

/// 금액 문자열을 최소 단위 정수로 변환
/// 비어 있거나 잘못된 값은 화면 전체를 실패시키지 않도록 0으로 처리한다.
pub fn parse_money_cents(value: Option<&str>) -> i64 {
    value.and_then(parse_money_cents_strict).unwrap_or(0)
}

/// 금액 문자열 엄격 변환. 정수로 표현되지 않으면 None.
pub fn parse_money_cents_strict(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().and_then(whole_cents))
}

fn whole_cents(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

/// 최소 단위 금액을 표시용 문자열로 변환 (예: 10500 -> "105.00 VND")
pub fn format_cents(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

// endregion: --- Parsing & Formatting

// region:    --- Serde Helpers

struct CentsVisitor;

impl<'de> Visitor<'de> for CentsVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer amount in minor units, as a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(0))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        Ok(whole_cents(v).unwrap_or(0))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        Ok(parse_money_cents(Some(v)))
    }
}

/// 요청 본문용. 정수로 표현되지 않는 금액은 역직렬화 에러.
struct StrictCentsVisitor;

impl<'de> Visitor<'de> for StrictCentsVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer amount in minor units, as a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        i64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        whole_cents(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_money_cents_strict(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

/// 요청 본문의 금액 필드용 (잘못된 값은 0으로 바꾸지 않고 거절)
pub mod strict_cents_string {
    use super::StrictCentsVisitor;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(cents)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(StrictCentsVisitor)
    }
}

/// 요청 본문의 `Option<i64>` 금액 필드용
pub mod option_strict_cents_string {
    use super::StrictCentsVisitor;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        super::option_cents_string::serialize(cents, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        #[derive(Deserialize)]
        struct Strict(#[serde(with = "crate::money::strict_cents_string")] i64);

        Ok(Option::<Strict>::deserialize(deserializer)?.map(|Strict(cents)| cents))
    }
}

/// 금액 필드를 10진수 문자열로 직렬화하고, 숫자/문자열 모두를 관대하게 역직렬화
pub mod cents_string {
    use super::CentsVisitor;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(cents)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(CentsVisitor)
    }
}

/// `Option<i64>` 금액 필드용 (null 허용)
pub mod option_cents_string {
    use super::CentsVisitor;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match cents {
            Some(cents) => serializer.collect_str(cents),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        struct OptionVisitor;

        impl<'de> Visitor<'de> for OptionVisitor {
            type Value = Option<i64>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an optional amount in minor units")
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
                d.deserialize_any(CentsVisitor).map(Some)
            }
        }

        deserializer.deserialize_option(OptionVisitor)
    }
}

// endregion: --- Serde Helpers

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Priced {
        #[serde(with = "cents_string")]
        price: i64,
        #[serde(with = "option_cents_string", default)]
        reserve: Option<i64>,
    }

    #[test]
    fn malformed_money_parses_to_zero() {
        assert_eq!(parse_money_cents(None), 0);
        assert_eq!(parse_money_cents(Some("")), 0);
        assert_eq!(parse_money_cents(Some("abc")), 0);
        assert_eq!(parse_money_cents(Some("12.5")), 0);
        assert_eq!(parse_money_cents(Some("NaN")), 0);
        assert_eq!(parse_money_cents(Some(" 10500 ")), 10500);
        assert_eq!(parse_money_cents(Some("1e3")), 1000);
    }

    #[test]
    fn formats_minor_units() {
        assert_eq!(format_cents(10500, "VND"), "105.00 VND");
        assert_eq!(format_cents(7, "USD"), "0.07 USD");
        assert_eq!(format_cents(-250, "EUR"), "-2.50 EUR");
    }

    #[test]
    fn money_crosses_as_string_and_accepts_numbers() {
        let json = serde_json::to_value(Priced {
            price: 11000,
            reserve: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"price": "11000", "reserve": null}));

        let parsed: Priced =
            serde_json::from_value(serde_json::json!({"price": 500, "reserve": "oops"})).unwrap();
        assert_eq!(
            parsed,
            Priced {
                price: 500,
                reserve: Some(0)
            }
        );

        let parsed: Priced = serde_json::from_value(serde_json::json!({"price": "12"})).unwrap();
        assert_eq!(parsed.reserve, None);
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Order {
        #[serde(with = "strict_cents_string")]
        price: i64,
        #[serde(with = "option_strict_cents_string", default)]
        limit: Option<i64>,
    }

    #[test]
    fn strict_amounts_reject_malformed_input() {
        let parsed: Order =
            serde_json::from_value(serde_json::json!({"price": "1e3", "limit": 7})).unwrap();
        assert_eq!(
            parsed,
            Order {
                price: 1000,
                limit: Some(7)
            }
        );
        let parsed: Order =
            serde_json::from_value(serde_json::json!({"price": 5, "limit": null})).unwrap();
        assert_eq!(parsed.limit, None);

        for body in [
            serde_json::json!({"price": "abc"}),
            serde_json::json!({"price": "12.50"}),
            serde_json::json!({"price": 12.5}),
            serde_json::json!({"price": u64::MAX}),
            serde_json::json!({"price": 1, "limit": "oops"}),
            serde_json::json!({"price": 1, "limit": true}),
        ] {
            assert!(serde_json::from_value::<Order>(body).is_err());
        }
        assert_eq!(parse_money_cents_strict("12.50"), None);
        assert_eq!(parse_money_cents_strict(" 42 "), Some(42));
    }
}
