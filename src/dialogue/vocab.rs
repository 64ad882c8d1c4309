//! Thai command keywords and reply templates.
//!
//! Keywords are matched as substrings of the whitespace-free transcript, so
//! none of them contain spaces.

use crate::sensors::SensorSnapshot;

/// Wake phrase ("open the system").
pub const WAKE: &[&str] = &["เปิดระบบ"];
/// "Edit", leads to moisture setup.
pub const EDIT: &[&str] = &["แก้ไข"];
/// "Check", in both common spellings, and "verify".
pub const CHECK: &[&str] = &["เช็ค", "เช็ก", "ตรวจสอบ"];

pub const LIGHT: &[&str] = &["แสง"];
pub const MOISTURE: &[&str] = &["ความชื้น"];
pub const FERTILIZER: &[&str] = &["ปุ๋ย"];

/// Accepted moisture set-points, in matching order.
pub const SETPOINTS: &[(&str, u8)] = &[
    ("ยี่สิบ", 20),
    ("สี่สิบ", 40),
    ("หกสิบ", 60),
    ("แปดสิบ", 80),
];

pub const REPLY_WAKE: &str = "ตินตินพร้อมรับคำสั่งแล้วค่ะ";
pub const REPLY_EDIT: &str = "พร้อมทำการตั้งค่าความชื้นแล้วค่ะ";
pub const REPLY_CHECK: &str = "ต้องการตรวจสอบความชื้น, แสง หรือค่าปุ๋ย คะ";

pub fn light_reply(snapshot: &SensorSnapshot) -> String {
    format!("แสงปัจจุบันคือ {} ลัมเมนต์ค่ะ", snapshot.light)
}

pub fn moisture_reply(snapshot: &SensorSnapshot) -> String {
    format!("ความชื้นปัจจุบันคือ {} เปอร์เซ็นต์ค่ะ", snapshot.moisture)
}

pub fn fertilizer_reply(snapshot: &SensorSnapshot) -> String {
    format!(
        "ค่าN:{}% ค่าP:{}% ค่าK:{}% ค่ะ",
        snapshot.nitrogen, snapshot.phosphorus, snapshot.potassium
    )
}

pub fn setpoint_reply(value: u8) -> String {
    format!("ตั้งค่าความชื้นเป็น {value} เปอร์เซ็นต์แล้วค่ะ")
}

/// `true` if `text` contains any of `keywords`.
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// First set-point whose number word occurs in `text`.
pub fn setpoint_in(text: &str) -> Option<u8> {
    SETPOINTS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|&(_, value)| value)
}

/// Every keyword, space separated.
///
/// Handed to Whisper as its initial prompt, which biases decoding toward
/// the command vocabulary.
pub fn recognizer_prompt() -> String {
    let words = [WAKE, EDIT, CHECK, LIGHT, MOISTURE, FERTILIZER]
        .into_iter()
        .flatten()
        .copied()
        .chain(SETPOINTS.iter().map(|(word, _)| *word));

    words.collect::<Vec<_>>().join(" ")
}
