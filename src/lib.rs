//! Voice front-end for a garden sensor node.
//!
//! Thai voice commands are transcribed with Whisper, matched by a small
//! dialogue state machine and answered with synthesised speech, using live
//! readings from an MQTT sensor feed.  A confirmed moisture set-point is
//! published back onto the feed.
//!
//! | Module | Role |
//! |--------|------|
//! | [`sensors`] | latest reading per sensor, shared between feed and dialogue |
//! | [`feed`] | MQTT ingress into the store, outbound set-point publishing |
//! | [`audio`] | microphone capture, capture gate, VAD helpers, playback |
//! | [`stt`] | Whisper engine and model resolution |
//! | [`listen`] | utterance segmentation and the transcript stream |
//! | [`speech`] | text-to-speech sink |
//! | [`dialogue`] | state machine and turn controller |
//! | [`config`] | TOML settings and platform paths |

pub mod audio;
pub mod config;
pub mod dialogue;
pub mod feed;
pub mod listen;
pub mod sensors;
pub mod speech;
pub mod stt;
