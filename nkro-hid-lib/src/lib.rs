#![cfg_attr(not(test), no_std)]

pub mod keycode;
pub mod leds;
pub mod mouse;
pub mod report;
