//! M-Pesa STK push callback envelope.
//!
//! Only `ResultCode` and the presence of `CallbackMetadata` drive behaviour.
//! Everything else is informational and read leniently: a field of an
//! unexpected type is treated as absent rather than failing the callback.

use serde_json::Value;

use crate::model::error::CallbackError;
use crate::model::PaymentResult;

/// Provider result code for a completed payment.
pub const SUCCESS_RESULT_CODE: i64 = 0;

pub const RECEIPT_NUMBER_ITEM: &str = "MpesaReceiptNumber";

/// A callback that passed structural validation.
#[derive(Debug, Clone)]
pub struct PaymentCallback {
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub result_code: Option<Value>,
    pub result_desc: Option<String>,
    pub metadata: Value,
}

impl PaymentCallback {
    pub fn from_slice(raw: &[u8]) -> Result<Self, CallbackError> {
        let envelope: Value = serde_json::from_slice(raw)?;
        let stk = envelope
            .get("Body")
            .and_then(|b| b.get("stkCallback"))
            .filter(|s| s.is_object())
            .ok_or(CallbackError::MissingCallback)?;
        let metadata = stk
            .get("CallbackMetadata")
            .filter(|m| is_truthy(m))
            .ok_or(CallbackError::MissingMetadata)?;

        Ok(Self {
            merchant_request_id: stk.get("MerchantRequestID").and_then(text),
            checkout_request_id: stk.get("CheckoutRequestID").and_then(text),
            result_code: stk.get("ResultCode").filter(|c| !c.is_null()).cloned(),
            result_desc: stk.get("ResultDesc").and_then(text),
            metadata: metadata.clone(),
        })
    }

    /// Only a numeric zero counts; a string `"0"` or a missing code is a failure.
    pub fn is_success(&self) -> bool {
        match &self.result_code {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(code) => code == SUCCESS_RESULT_CODE,
                None => n.as_f64() == Some(SUCCESS_RESULT_CODE as f64),
            },
            _ => false,
        }
    }

    /// Value of the first `CallbackMetadata.Item` entry called `name`.
    /// Entries without a string `Name` are skipped.
    pub fn metadata_value(&self, name: &str) -> Option<&Value> {
        self.metadata
            .get("Item")
            .and_then(Value::as_array)?
            .iter()
            .find(|item| item.get("Name").and_then(Value::as_str) == Some(name))
            .and_then(|item| item.get("Value"))
            .filter(|v| !v.is_null())
    }

    pub fn receipt_number(&self) -> Option<String> {
        self.metadata_value(RECEIPT_NUMBER_ITEM).and_then(text)
    }

    pub fn payment_result(&self) -> PaymentResult {
        PaymentResult {
            code: self
                .result_code
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_default(),
            description: self.result_desc.clone().unwrap_or_default(),
        }
    }
}

// same rules as a JavaScript `if (value)`
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
