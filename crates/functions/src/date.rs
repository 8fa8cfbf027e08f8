//! `getCurrentDate`: the server's current date and time, rendered with
//! Spanish day and month names.

use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeZone, Timelike, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use ym_domain::error::Result;
use ym_domain::tool::ToolDefinition;

use crate::registry::FunctionHandler;

pub const NAME: &str = "getCurrentDate";

const DAY_NAMES: [&str; 7] = [
    "domingo",
    "lunes",
    "martes",
    "miércoles",
    "jueves",
    "viernes",
    "sábado",
];

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Short,
    #[default]
    Medium,
    Long,
}

impl DateFormat {
    /// Unknown or missing values fall back to `medium`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("short") => DateFormat::Short,
            Some("long") => DateFormat::Long,
            _ => DateFormat::Medium,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDate {
    pub iso: String,
    pub date: String,
    pub time: String,
    pub format: DateFormat,
    pub full_text: String,
    pub timestamp: i64,
}

/// Render `now` in the requested format.
pub fn render<Tz: TimeZone>(now: &DateTime<Tz>, format: DateFormat) -> CurrentDate {
    let day = now.day();
    let month = now.month();
    let year = now.year();
    let month_name = MONTH_NAMES[now.month0() as usize];
    let hm = format!("{}:{:02}", now.hour(), now.minute());

    let (date, time) = match format {
        DateFormat::Short => (format!("{day}/{month}/{year}"), hm),
        DateFormat::Medium => (format!("{day} de {month_name} de {year}"), hm),
        DateFormat::Long => {
            let weekday = DAY_NAMES[now.weekday().num_days_from_sunday() as usize];
            (
                format!("{weekday} {day} de {month_name} de {year}"),
                format!("{hm}:{:02}", now.second()),
            )
        }
    };

    CurrentDate {
        iso: now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        full_text: format!("{date} a las {time}"),
        date,
        time,
        format,
        timestamp: now.timestamp_millis(),
    }
}

/// Registry handler for [`NAME`], using the server's local clock.
pub struct CurrentDateFunction;

#[async_trait::async_trait]
impl FunctionHandler for CurrentDateFunction {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.into(),
            description: "Obtiene la fecha y hora actual en formato legible".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "description": "Formato de la fecha (short, medium, long)",
                        "enum": ["short", "medium", "long"]
                    }
                },
                "required": []
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value> {
        let format = DateFormat::parse(args.get("format").and_then(Value::as_str));
        Ok(serde_json::to_value(render(&Local::now(), format))?)
    }
}
