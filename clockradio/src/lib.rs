#![no_std]

//! ESP32-S3 adapters between esp-hal peripherals and the clock-radio core.

pub mod board;
pub mod config;
