//! Core building blocks shared by both engines

pub mod time;
