use crate::{TransactionRequest, ValidationError, config::GasConfig};
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::hex;
use serde_json::{Map, Value};

const ADDRESS_EXPECTED: &str = "expected a 0x-prefixed 20-byte hex address string";

/// Parameter normalizer
///
/// Checks that every field of a raw `eth_sendTransaction` object has the
/// expected primitive shape and fills in defaults. Never touches state.
#[derive(Debug, Clone)]
pub struct Normalizer {
    defaults: GasConfig,
}

impl Normalizer {
    pub fn new(defaults: GasConfig) -> Self {
        Self { defaults }
    }

    /// Turn the `params` of a submission into a typed request.
    ///
    /// Addresses are checked before any quantity so a malformed `to` is
    /// reported even when a numeric field is also wrong.
    pub fn normalize(&self, params: &Value) -> Result<TransactionRequest, ValidationError> {
        let object = transaction_object(params)?;

        let from = match field(object, "from") {
            Some(value) => parse_address("from", value)?,
            None => return Err(ValidationError::shape("from", "missing sender address")),
        };
        let to = field(object, "to")
            .map(|value| parse_address("to", value))
            .transpose()?;

        let value = optional_quantity(object, "value")?.unwrap_or_default();
        let gas_limit = optional_quantity(object, "gas")?
            .unwrap_or_else(|| U256::from(self.defaults.default_gas_limit));
        if gas_limit.is_zero() {
            return Err(ValidationError::shape(
                "gas",
                "gas limit must be greater than zero",
            ));
        }
        let gas_price = optional_quantity(object, "gasPrice")?
            .unwrap_or_else(|| U256::from(self.defaults.default_gas_price));
        let nonce = field(object, "nonce")
            .map(|value| parse_nonce("nonce", value))
            .transpose()?;

        let data = match (field(object, "data"), field(object, "input")) {
            (Some(value), _) => parse_data("data", value)?,
            (None, Some(value)) => parse_data("input", value)?,
            (None, None) => Bytes::default(),
        };

        Ok(TransactionRequest {
            from,
            to,
            value,
            gas_limit,
            gas_price,
            data,
            nonce,
        })
    }
}

/// `params[0]` as a JSON object
fn transaction_object(params: &Value) -> Result<&Map<String, Value>, ValidationError> {
    let first = params
        .as_array()
        .and_then(|params| params.first())
        .ok_or_else(|| ValidationError::shape("params", "expected [transaction]"))?;

    first.as_object().ok_or_else(|| {
        ValidationError::shape(
            "params",
            format!("expected a transaction object, got {}", describe(first)),
        )
    })
}

/// A present, non-null field
fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn optional_quantity(
    object: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<U256>, ValidationError> {
    field(object, name)
        .map(|value| parse_quantity(name, value))
        .transpose()
}

/// Parse an address-shaped JSON string.
///
/// Anything that is not a string is refused outright, including objects
/// such as `{"type": "Buffer", "data": [...]}` that some clients produce
/// when serializing raw bytes.
pub fn parse_address(field: &'static str, value: &Value) -> Result<Address, ValidationError> {
    let text = value.as_str().ok_or_else(|| {
        ValidationError::shape(field, format!("{ADDRESS_EXPECTED}, got {}", describe(value)))
    })?;

    let bytes = strip_hex_prefix(text)
        .filter(|digits| digits.len() == 40)
        .and_then(decode_hex)
        .ok_or_else(|| ValidationError::shape(field, format!("{ADDRESS_EXPECTED}, got \"{text}\"")))?;

    Ok(Address::from_slice(&bytes))
}

/// Parse a 32-byte hash such as a transaction hash
pub fn parse_hash(field: &'static str, value: &Value) -> Result<H256, ValidationError> {
    value
        .as_str()
        .and_then(strip_hex_prefix)
        .filter(|digits| digits.len() == 64)
        .and_then(decode_hex)
        .map(|bytes| H256::from_slice(&bytes))
        .ok_or_else(|| ValidationError::shape(field, "expected a 0x-prefixed 32-byte hex string"))
}

/// Parse a quantity: a `0x` hex string (`"0x"` reads as zero) or a
/// non-negative JSON integer.
pub fn parse_quantity(field: &'static str, value: &Value) -> Result<U256, ValidationError> {
    match value {
        Value::String(text) => {
            let digits = strip_hex_prefix(text).ok_or_else(|| {
                ValidationError::shape(field, format!("expected a 0x-prefixed hex quantity, got \"{text}\""))
            })?;
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ValidationError::shape(
                    field,
                    format!("expected a 0x-prefixed hex quantity, got \"{text}\""),
                ));
            }

            let significant = digits.trim_start_matches('0');
            if significant.is_empty() {
                return Ok(U256::zero());
            }
            if significant.len() > 64 {
                return Err(ValidationError::shape(field, "quantity does not fit in 256 bits"));
            }
            U256::from_str_radix(significant, 16)
                .map_err(|_| ValidationError::shape(field, "quantity does not fit in 256 bits"))
        }
        Value::Number(number) => number.as_u64().map(U256::from).ok_or_else(|| {
            ValidationError::shape(field, format!("expected a non-negative integer, got {number}"))
        }),
        other => Err(ValidationError::shape(
            field,
            format!("expected a hex quantity string, got {}", describe(other)),
        )),
    }
}

fn parse_nonce(field: &'static str, value: &Value) -> Result<u64, ValidationError> {
    let nonce = parse_quantity(field, value)?;
    if nonce > U256::from(u64::MAX) {
        return Err(ValidationError::shape(field, "nonce does not fit in 64 bits"));
    }
    Ok(nonce.low_u64())
}

fn parse_data(field: &'static str, value: &Value) -> Result<Bytes, ValidationError> {
    let text = value.as_str().ok_or_else(|| {
        ValidationError::shape(field, format!("expected a 0x-prefixed hex string, got {}", describe(value)))
    })?;

    strip_hex_prefix(text)
        .and_then(decode_hex)
        .map(Bytes::from)
        .ok_or_else(|| {
            ValidationError::shape(
                field,
                format!("expected a 0x-prefixed even-length hex string, got \"{text}\""),
            )
        })
}

fn strip_hex_prefix(text: &str) -> Option<&str> {
    text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))
}

/// Decode bare hex digits. Digits are checked first because the decoder
/// would otherwise accept a second `0x` prefix.
fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    hex::decode(digits).ok()
}

/// Name of a JSON value's type for error messages
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
