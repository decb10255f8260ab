//! Horoscope stub tool.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use super::traits::{str_arg, Tool, ToolError};

const SIGNS: &[&str] = &[
    "Aries",
    "Taurus",
    "Gemini",
    "Cancer",
    "Leo",
    "Virgo",
    "Libra",
    "Scorpio",
    "Sagittarius",
    "Capricorn",
    "Aquarius",
    "Pisces",
];

/// Fixed horoscope for any known zodiac sign.
pub fn horoscope(sign: &str) -> String {
    let wanted = sign.trim();
    match SIGNS.iter().find(|s| s.eq_ignore_ascii_case(wanted)) {
        Some(sign) => format!("{}: Next Tuesday you will befriend a baby otter.", sign),
        None => {
            warn!("Horoscope for '{}' not found.", sign);
            format!("Horoscope for '{}' not found.", sign)
        }
    }
}

pub struct HoroscopeTool;

#[async_trait]
impl Tool for HoroscopeTool {
    fn name(&self) -> &str {
        "get_horoscope"
    }

    fn description(&self) -> &str {
        "Get today's horoscope for an astrological sign."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "sign": {
                    "type": "string",
                    "description": "An astrological sign like Taurus or Aquarius."
                }
            },
            "required": ["sign"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        Ok(horoscope(str_arg(args, "sign")))
    }
}
