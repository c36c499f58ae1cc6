//! Landmark wire format: one s-expression plist per frame.
//!
//! ```text
//! (:t 12.345 :width 640 :height 480 :hand (x0 y0 x1 y1 ... x20 y20))
//! ```
//!
//! `:hand` may also be a list of pairs `((x0 y0) (x1 y1) ...)`.  `:t`,
//! `:width` and `:height` are optional.  A missing, `nil` or empty `:hand`
//! means no hand in the frame.

use lexpr::Value;

use super::CapturedFrame;
use crate::tracking::{HandLandmarks, Landmark, JOINT_COUNT};

/// Parse one wire line.
///
/// - `default_size`: frame size when `:width`/`:height` are absent.
/// - `now`: timestamp (seconds) when `:t` is absent.
pub fn parse_frame(line: &str, default_size: (u32, u32), now: f64) -> anyhow::Result<CapturedFrame> {
    let value = lexpr::from_str(line)
        .map_err(|e| anyhow::anyhow!("malformed s-expression: {}", e))?;
    if !matches!(value, Value::Cons(_)) {
        anyhow::bail!("expected a plist, got {}", value);
    }

    let timestamp_s = match plist_get(&value, "t") {
        Some(v) => get_number(v).ok_or_else(|| anyhow::anyhow!(":t is not a number: {}", v))?,
        None => now,
    };
    let width = get_dimension(&value, "width")?.unwrap_or(default_size.0);
    let height = get_dimension(&value, "height")?.unwrap_or(default_size.1);

    let hand = match plist_get(&value, "hand") {
        Some(v) if !is_nil(v) => Some(parse_hand(v)?),
        _ => None,
    };

    Ok(CapturedFrame {
        timestamp_s,
        width,
        height,
        hand,
    })
}

/// Format a frame back into the wire format.
pub fn format_frame(frame: &CapturedFrame) -> String {
    let hand = match &frame.hand {
        Some(hand) => {
            let coords: Vec<String> = hand
                .points()
                .iter()
                .map(|p| format!("{} {}", p.x, p.y))
                .collect();
            format!("({})", coords.join(" "))
        }
        None => "nil".to_string(),
    };
    format!(
        "(:t {} :width {} :height {} :hand {})",
        frame.timestamp_s, frame.width, frame.height, hand
    )
}

fn parse_hand(value: &Value) -> anyhow::Result<HandLandmarks> {
    let coords = flatten_list(value)
        .into_iter()
        .map(|v| {
            get_number(v)
                .map(|n| n as f32)
                .ok_or_else(|| anyhow::anyhow!("non-numeric coordinate: {}", v))
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;

    if coords.len() != JOINT_COUNT * 2 {
        anyhow::bail!(
            "expected {} coordinates ({} joints), got {}",
            JOINT_COUNT * 2,
            JOINT_COUNT,
            coords.len()
        );
    }

    let points: Vec<Landmark> = coords
        .chunks_exact(2)
        .map(|c| Landmark::new(c[0], c[1]))
        .collect();
    HandLandmarks::from_slice(&points)
        .ok_or_else(|| anyhow::anyhow!("wrong joint count: {}", points.len()))
}

// ── Plist helpers ──────────────────────────────────────────

/// Value following `:key` in a plist.
fn plist_get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

fn get_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn get_dimension(value: &Value, key: &str) -> anyhow::Result<Option<u32>> {
    match plist_get(value, key) {
        None => Ok(None),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(d) if d > 0 && d <= u32::MAX as u64 => Ok(Some(d as u32)),
            _ => anyhow::bail!(":{} must be a positive integer, got {}", key, n),
        },
        Some(other) => anyhow::bail!(":{} must be a positive integer, got {}", key, other),
    }
}

fn is_nil(value: &Value) -> bool {
    match value {
        Value::Nil | Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Flatten a possibly nested list/cons structure into a Vec of leaf values.
fn flatten_list(value: &Value) -> Vec<&Value> {
    let mut result = Vec::new();
    fn walk<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
        match v {
            Value::Cons(pair) => {
                walk(pair.car(), out);
                walk(pair.cdr(), out);
            }
            Value::Vector(items) => {
                for item in items.iter() {
                    walk(item, out);
                }
            }
            Value::Null | Value::Nil => {}
            other => out.push(other),
        }
    }
    walk(value, &mut result);
    result
}

// ── Tests ──────────────────────────────────────────────────
