//! Final answers synthesized from function results.

use serde_json::Value;

/// Natural-language answer for a successful function call.
pub fn synthesize(function: &str, result: &Value) -> String {
    if function == ym_functions::date::NAME {
        let date = result.get("date").and_then(Value::as_str);
        let time = result.get("time").and_then(Value::as_str);
        if let (Some(date), Some(time)) = (date, time) {
            return format!("Today is {date} and the current time is {time}.");
        }
    }
    let json = serde_json::to_string(result).unwrap_or_else(|_| result.to_string());
    format!("I obtained the following information: {json}")
}
