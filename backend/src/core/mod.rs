//! Core building blocks shared by the engine

pub mod time;
