//! Form input model
//!
//! The control panel holds plain text for the six coordinate fields and
//! numeric slider values. Text is parsed the way a browser's `parseFloat`
//! does: leading whitespace is skipped and the longest numeric prefix wins,
//! so `"1.5 cm"` reads as `1.5` and `"abc"` reads as nothing.

use serde::{Deserialize, Serialize};

use crate::config::SliderConfig;
use crate::vector::Vec3;

/// Default velocity field text
pub const DEFAULT_VELOCITY: [&str; 3] = ["0.0", "0.0", "0.1"];

/// Parse the longest numeric prefix of `text`
pub fn parse_float(text: &str) -> Option<f64> {
    let s = text.trim_start();

    let bytes = s.as_bytes();
    let mut i = 0;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        let v = if bytes.first() == Some(&b'-') { f64::NEG_INFINITY } else { f64::INFINITY };
        return Some(v);
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    let mut end = i;

    // Exponent only counts when at least one digit follows it
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().ok()
}

/// Format a coordinate for display next to a field
pub fn format_coordinate(v: f64) -> String {
    format!("{:.1}", v)
}

/// Label shown next to the speed slider
pub fn speed_label(speed: f64) -> String {
    format!("{:.2}", speed)
}

/// Label shown next to the zoom slider
pub fn zoom_label(zoom: f64) -> String {
    format!("{:.2}×", zoom)
}

/// State of the control panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInputs {
    /// Position fields as typed
    pub position: [String; 3],
    /// Velocity fields as typed
    pub velocity: [String; 3],
    /// Normalise the direction before applying speed
    pub normalize: bool,
    pub speed: f64,
    pub zoom: f64,
}

impl FormInputs {
    /// Inputs with the position fields pointing at `corner`
    pub fn new(corner: Vec3, speed: &SliderConfig, zoom: &SliderConfig) -> Self {
        let mut inputs = Self {
            position: Default::default(),
            velocity: DEFAULT_VELOCITY.map(String::from),
            normalize: true,
            speed: speed.default,
            zoom: zoom.default,
        };
        inputs.set_position(corner);
        inputs
    }

    /// Overwrite the position fields; the text reads back as exactly `p`
    pub fn set_position(&mut self, p: Vec3) {
        self.position = p.to_array().map(|c| c.to_string());
    }

    /// Position rounded to one decimal for display
    pub fn position_labels(&self) -> Option<[String; 3]> {
        self.parse_position().map(|p| p.to_array().map(format_coordinate))
    }

    /// Overwrite the velocity fields
    pub fn set_velocity(&mut self, v: Vec3) {
        self.velocity = v.to_array().map(|c| c.to_string());
    }

    /// Restore velocity fields to their defaults
    pub fn reset_velocity(&mut self) {
        self.velocity = DEFAULT_VELOCITY.map(String::from);
    }

    /// Position typed into the fields, if all three parse
    pub fn parse_position(&self) -> Option<Vec3> {
        parse_vec3(&self.position)
    }

    /// Velocity typed into the fields; a field that does not parse becomes
    /// NaN and is rejected at launch
    pub fn parse_velocity(&self) -> Vec3 {
        let [x, y, z] = &self.velocity;
        let c = |s: &String| parse_float(s).unwrap_or(f64::NAN);
        Vec3::new(c(x), c(y), c(z))
    }

    pub fn speed_label(&self) -> String {
        speed_label(self.speed)
    }

    pub fn zoom_label(&self) -> String {
        zoom_label(self.zoom)
    }
}

fn parse_vec3(fields: &[String; 3]) -> Option<Vec3> {
    let [x, y, z] = fields;
    Some(Vec3::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}
